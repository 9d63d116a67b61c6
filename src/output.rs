//! Plain-text rendering of operation results.

use std::fmt::{self, Display, Write};

use crate::ops::FolderRow;
use crate::types::{Message, MessageSummary};

/// A table with a header row, drawn with ASCII borders:
///
/// ```text
/// +---+---------+
/// | # | Subject |
/// +---+---------+
/// | 1 | Hello   |
/// +---+---------+
/// ```
///
/// Cells are left-aligned and every column is as wide as its widest cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// A table with the given column headers and no rows.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Table {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing cells are left blank; extra cells are dropped.
    pub fn add_row<I, T>(&mut self, row: I)
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        let mut cells: Vec<String> = row
            .into_iter()
            .take(self.headers.len())
            .map(|cell| cell.to_string().replace(['\r', '\n'], " "))
            .collect();
        cells.resize(self.headers.len(), String::new());
        self.rows.push(cells);
    }

    /// The number of rows, not counting the header.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no rows were added.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }
}

fn rule(f: &mut fmt::Formatter<'_>, widths: &[usize]) -> fmt::Result {
    f.write_char('+')?;
    for width in widths {
        write!(f, "{}+", "-".repeat(width + 2))?;
    }
    f.write_char('\n')
}

fn line(f: &mut fmt::Formatter<'_>, widths: &[usize], cells: &[String]) -> fmt::Result {
    f.write_char('|')?;
    for (width, cell) in widths.iter().zip(cells) {
        let pad = width - cell.chars().count();
        write!(f, " {}{} |", cell, " ".repeat(pad))?;
    }
    f.write_char('\n')
}

impl Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        rule(f, &widths)?;
        line(f, &widths, &self.headers)?;
        rule(f, &widths)?;
        for row in &self.rows {
            line(f, &widths, row)?;
        }
        if !self.rows.is_empty() {
            rule(f, &widths)?;
        }
        Ok(())
    }
}

/// The `folders` listing.
pub fn folder_table(rows: &[FolderRow]) -> Table {
    let mut table = Table::new(vec!["Name", "Flags", "Delimiter", "Messages", "Unread"]);
    for row in rows {
        let (messages, unseen) = match row.status {
            Some(status) => (status.messages.to_string(), status.unseen.to_string()),
            None => (String::new(), String::new()),
        };
        table.add_row(vec![
            row.folder.name.clone(),
            row.folder.attributes.join(" "),
            row.folder.delimiter.clone().unwrap_or_default(),
            messages,
            unseen,
        ]);
    }
    table
}

/// The `messages` listing.
pub fn message_table(summaries: &[MessageSummary]) -> Table {
    let mut table = Table::new(vec!["#", "From", "Subject", "Timestamp", "Flags"]);
    for summary in summaries {
        table.add_row(vec![
            summary.seq.to_string(),
            summary.headers.from.clone().unwrap_or_default(),
            summary.headers.subject.clone().unwrap_or_default(),
            summary
                .internal_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
            summary.flags.to_string(),
        ]);
    }
    table
}

/// The metadata `peek` shows above the message itself.
pub fn message_metadata(message: &Message) -> Table {
    let mut table = Table::new(vec!["Field", "Value"]);
    table.add_row(vec!["#".to_string(), message.seq.to_string()]);
    if let Some(ref from) = message.headers.from {
        table.add_row(vec!["From".to_string(), from.clone()]);
    }
    if let Some(ref to) = message.headers.to {
        table.add_row(vec!["To".to_string(), to.clone()]);
    }
    if let Some(ref subject) = message.headers.subject {
        table.add_row(vec!["Subject".to_string(), subject.clone()]);
    }
    if let Some(date) = message.internal_date {
        table.add_row(vec!["Timestamp".to_string(), date.to_rfc3339()]);
    }
    table.add_row(vec!["Flags".to_string(), message.flags.to_string()]);
    table.add_row(vec!["Size".to_string(), message.body.len().to_string()]);
    table
}
