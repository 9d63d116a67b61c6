use std::fmt;

use super::Seq;

/// A set of message sequence numbers in the compact `1:3,7,9:12` form IMAP commands take.
///
/// The numbers are sorted and de-duplicated on construction, so consecutive runs collapse into
/// ranges regardless of the order a `SEARCH` returned them in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceSet(Vec<Seq>);

impl SequenceSet {
    /// Build a set from sequence numbers in any order.
    pub fn new<I: IntoIterator<Item = Seq>>(seqs: I) -> Self {
        let mut seqs: Vec<Seq> = seqs.into_iter().collect();
        seqs.sort_unstable();
        seqs.dedup();
        SequenceSet(seqs)
    }

    /// The sequence numbers, ascending.
    pub fn as_slice(&self) -> &[Seq] {
        &self.0
    }

    /// The number of messages in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the set names no messages.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SequenceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.0.iter().copied().peekable();
        let mut first = true;
        while let Some(start) = iter.next() {
            let mut end = start;
            while iter.peek() == Some(&(end + 1)) {
                end += 1;
                iter.next();
            }

            if !first {
                f.write_str(",")?;
            }
            first = false;

            if start == end {
                write!(f, "{}", start)?;
            } else {
                write!(f, "{}:{}", start, end)?;
            }
        }
        Ok(())
    }
}
