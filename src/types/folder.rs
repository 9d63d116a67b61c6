use std::fmt;

/// A folder returned by `LIST`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderInfo {
    /// The full folder name, as the server spells it.
    pub name: String,
    /// The hierarchy delimiter. `None` means the name is flat.
    pub delimiter: Option<String>,
    /// Name attributes such as `\Noselect` or `\HasChildren`.
    pub attributes: Vec<String>,
}

impl FolderInfo {
    /// Make a folder entry with no attributes.
    pub fn new<S: Into<String>>(name: S, delimiter: Option<&str>) -> Self {
        FolderInfo {
            name: name.into(),
            delimiter: delimiter.map(str::to_string),
            attributes: Vec::new(),
        }
    }

    /// Whether the name can be passed to `SELECT` or `STATUS`.
    pub fn is_selectable(&self) -> bool {
        !self.attributes.iter().any(|a| {
            a.eq_ignore_ascii_case("\\Noselect") || a.eq_ignore_ascii_case("\\NonExistent")
        })
    }
}

/// A snapshot of a folder's message counts, taken with `STATUS (MESSAGES UNSEEN)`.
///
/// Nothing keeps it fresh: other clients may change the folder right after it was taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FolderStatus {
    /// Number of messages in the folder.
    pub messages: u32,
    /// Number of messages without the `\Seen` flag.
    pub unseen: u32,
}

impl fmt::Display for FolderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "messages: {}, unseen: {}", self.messages, self.unseen)
    }
}
