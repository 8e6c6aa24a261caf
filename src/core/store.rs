//! Record store - ordered collection of RMA entries
//!
//! Entries are addressed by session-local numeric ids (`1`, `2`, ... or `@1`,
//! `@2`, ...). Ids come from a counter that only ever increments, so an id is
//! never handed out twice even after its entry is deleted.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::core::entry::RmaEntry;

/// Identity of an entry inside a [`RecordStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = String;

    /// Accepts `@N` or a plain number
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_prefix('@').unwrap_or(s);
        digits
            .parse::<u64>()
            .map(EntryId)
            .map_err(|_| format!("Invalid entry id: '{}'. Use @N or N (e.g. @3)", s))
    }
}

/// Errors raised by store mutations
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("no entry with id {0}")]
    #[diagnostic(
        code(rma::store::not_found),
        help("run `rma entry list` to see the current ids")
    )]
    NotFound(EntryId),
}

/// Ordered, uniquely identified collection of entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoreFile", into = "StoreFile")]
pub struct RecordStore {
    entries: Vec<(EntryId, RmaEntry)>,
    /// Last id handed out (0 when nothing was ever inserted)
    counter: u64,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            counter: 0,
        }
    }

    /// Append an entry and return its new id
    pub fn insert(&mut self, entry: RmaEntry) -> EntryId {
        self.counter += 1;
        let id = EntryId(self.counter);
        self.entries.push((id, entry));
        id
    }

    /// Append several entries, preserving their order
    pub fn extend(&mut self, entries: impl IntoIterator<Item = RmaEntry>) -> Vec<EntryId> {
        entries.into_iter().map(|e| self.insert(e)).collect()
    }

    /// Replace the entry with the given id, keeping its position
    pub fn update(&mut self, id: EntryId, entry: RmaEntry) -> Result<(), StoreError> {
        let slot = self
            .entries
            .iter_mut()
            .find(|(eid, _)| *eid == id)
            .ok_or(StoreError::NotFound(id))?;
        slot.1 = entry;
        Ok(())
    }

    /// Remove every listed id. Unknown ids are ignored.
    ///
    /// Returns how many entries were actually removed.
    pub fn delete<'a>(&mut self, ids: impl IntoIterator<Item = &'a EntryId>) -> usize {
        let ids: Vec<EntryId> = ids.into_iter().copied().collect();
        let before = self.entries.len();
        self.entries.retain(|(id, _)| !ids.contains(id));
        before - self.entries.len()
    }

    /// Entry with the given id
    pub fn get(&self, id: EntryId) -> Option<&RmaEntry> {
        self.entries
            .iter()
            .find(|(eid, _)| *eid == id)
            .map(|(_, e)| e)
    }

    /// Entries in display order, without ids
    pub fn snapshot(&self) -> Vec<RmaEntry> {
        self.entries.iter().map(|(_, e)| e.clone()).collect()
    }

    /// Ids and entries in display order
    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &RmaEntry)> {
        self.entries.iter().map(|(id, e)| (*id, e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// On-disk shape of a store
#[derive(Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    entries: Vec<StoredEntry>,
}

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    id: EntryId,
    #[serde(flatten)]
    entry: RmaEntry,
}

impl From<StoreFile> for RecordStore {
    fn from(file: StoreFile) -> Self {
        let entries: Vec<(EntryId, RmaEntry)> =
            file.entries.into_iter().map(|s| (s.id, s.entry)).collect();
        // A hand-edited file must never let the counter fall behind a live id
        let highest = entries.iter().map(|(id, _)| id.0).max().unwrap_or(0);
        let counter = file.next_id.saturating_sub(1).max(highest);
        Self { entries, counter }
    }
}

impl From<RecordStore> for StoreFile {
    fn from(store: RecordStore) -> Self {
        Self {
            next_id: store.counter + 1,
            entries: store
                .entries
                .into_iter()
                .map(|(id, entry)| StoredEntry { id, entry })
                .collect(),
        }
    }
}
