use std::fmt::{Display, Formatter};

/// Longest entry accepted, in bytes.
pub const MAX_ENTRY_LEN: usize = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Inserted,
    AlreadyPresent,
    Empty,
    TooLong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    NotFound,
}

/// Unique strings kept in strictly increasing byte-wise order.
///
/// Head and tail are simply the first and last entries, so they cannot drift
/// from the contents whatever the length.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SortedList {
    entries: Vec<String>,
}

impl SortedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: &str) -> Insertion {
        if entry.is_empty() {
            return Insertion::Empty;
        }
        if entry.len() > MAX_ENTRY_LEN {
            return Insertion::TooLong;
        }

        match self.position(entry) {
            Ok(_) => Insertion::AlreadyPresent,
            Err(position) => {
                self.entries.insert(position, entry.to_owned());
                Insertion::Inserted
            }
        }
    }

    pub fn member(&self, entry: &str) -> bool {
        self.position(entry).is_ok()
    }

    pub fn delete(&mut self, entry: &str) -> Deletion {
        match self.position(entry) {
            Ok(position) => {
                self.entries.remove(position);
                Deletion::Deleted
            },
            Err(_) => Deletion::NotFound,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn head(&self) -> Option<&str> {
        self.entries.first().map(String::as_str)
    }

    pub fn tail(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    fn position(&self, entry: &str) -> Result<usize, usize> {
        self.entries.binary_search_by(|probe| probe.as_str().cmp(entry))
    }
}

impl Display for SortedList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "list = ")?;
        for entry in self.iter() {
            write!(f, "{entry} ")?;
        }
        Ok(())
    }
}
