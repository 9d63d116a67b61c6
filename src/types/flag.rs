use std::fmt;
use std::iter::FromIterator;

/// The `\Recent` system flag.
///
/// > Note: The `\Recent` system flag is a special case of a session flag.  `\Recent` can not be
/// > used as an argument in a `STORE` or `APPEND` command, and thus can not be changed at all.
///
/// A server sets it on delivery for the first session that sees a message, so it must never be
/// carried over when a message is appended somewhere else.
pub const RECENT: &str = "\\Recent";

/// The flags set on one message, as reported by a `FETCH` response.
///
/// Flags compare case-insensitively (`\SEEN` and `\Seen` are the same flag) and the set keeps
/// the first spelling it saw. Two sets are equal when they hold the same flags, in any order.
#[derive(Clone, Debug, Default)]
pub struct FlagSet(Vec<String>);

impl FlagSet {
    /// Make an empty set.
    pub fn new() -> Self {
        FlagSet(Vec::new())
    }

    /// Add a flag. Returns `false` if an equal flag was already present.
    pub fn insert<S: Into<String>>(&mut self, flag: S) -> bool {
        let flag = flag.into();
        if self.contains(&flag) {
            return false;
        }
        self.0.push(flag);
        true
    }

    /// Check whether `flag` is in the set, ignoring case.
    pub fn contains(&self, flag: &str) -> bool {
        self.0.iter().any(|f| f.eq_ignore_ascii_case(flag))
    }

    /// Remove `flag` in whatever casing it was stored. Returns `true` if it was present.
    pub fn remove(&mut self, flag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|f| !f.eq_ignore_ascii_case(flag));
        before != self.0.len()
    }

    /// A copy of this set that is safe to pass to `APPEND`: `\Recent` is dropped.
    pub fn without_recent(&self) -> FlagSet {
        let mut flags = self.clone();
        flags.remove(RECENT);
        flags
    }

    /// Iterate over the flags in the order they were first seen.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// The number of flags in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no flags are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Turn the set into flags the `imap` crate can send.
    pub fn to_imap_flags(&self) -> Vec<imap::types::Flag<'static>> {
        imap::types::Flag::from_strs(self.iter()).collect()
    }
}

impl PartialEq for FlagSet {
    fn eq(&self, other: &FlagSet) -> bool {
        self.len() == other.len() && self.iter().all(|f| other.contains(f))
    }
}

impl Eq for FlagSet {}

impl<S: Into<String>> FromIterator<S> for FlagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut flags = FlagSet::new();
        for flag in iter {
            flags.insert(flag);
        }
        flags
    }
}

impl<S: Into<String>> Extend<S> for FlagSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for flag in iter {
            self.insert(flag);
        }
    }
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}
