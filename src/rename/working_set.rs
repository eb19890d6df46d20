use crate::drive::FileEntry;

/// The files currently being worked on
///
/// Entries are replaced wholesale after a successful rename, never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingSet {
    entries: Vec<FileEntry>,
}

impl WorkingSet {
    pub fn new(entries: Vec<FileEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FileEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Swap in a newer snapshot of an entry, matched by ID
    ///
    /// Returns `false` if no entry with that ID is tracked.
    pub fn replace(&mut self, updated: FileEntry) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == updated.id) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }

    /// Drop every tracked entry
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn into_entries(self) -> Vec<FileEntry> {
        self.entries
    }
}

impl From<Vec<FileEntry>> for WorkingSet {
    fn from(entries: Vec<FileEntry>) -> Self {
        Self::new(entries)
    }
}
