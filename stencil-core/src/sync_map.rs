//! Path → record index for one session.
//!
//! A path is a key only while a remote record is known to exist for it.
//! Entries are inserted by the snapshot and by provisioning, replaced after
//! pushes and conflict refreshes, and never removed during a session.

use std::collections::HashMap;

use crate::types::{Record, RecordId, RelPath};

#[derive(Debug, Clone, Default)]
pub struct SyncMap {
    entries: HashMap<RelPath, Record>,
}

impl SyncMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &RelPath) -> Option<&Record> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &RelPath) -> bool {
        self.entries.contains_key(path)
    }

    /// Insert or replace the record known for `path`, returning the previous one.
    pub fn insert(&mut self, path: RelPath, record: Record) -> Option<Record> {
        self.entries.insert(path, record)
    }

    /// Find where a record currently lives. Paths can be reassigned while a
    /// push for the same id is pending, so deferred work resolves by id.
    pub fn locate(&self, id: &RecordId) -> Option<(&RelPath, &Record)> {
        self.entries.iter().find(|(_, record)| &record.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All known paths, sorted.
    pub fn paths(&self) -> Vec<RelPath> {
        let mut paths: Vec<RelPath> = self.entries.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RelPath, &Record)> {
        self.entries.iter()
    }
}

impl FromIterator<(RelPath, Record)> for SyncMap {
    fn from_iter<I: IntoIterator<Item = (RelPath, Record)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
