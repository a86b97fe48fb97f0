//! Ordered, append-only conversation log.
//!
//! Every mutation publishes a new immutable [`Transcript`] snapshot. Readers
//! holding an older snapshot keep seeing it unchanged, so a read never observes
//! a half-applied mutation.
//!
//! A pending placeholder, when present, always sits at the tail. Entries
//! committed while it is outstanding are placed just ahead of it, which keeps
//! committed entries in creation order and lets [`TranscriptStore::replace_last`]
//! resolve the placeholder without touching anything else.

use std::{slice, sync::Arc};

use shared::domain::Entry;

use crate::error::TranscriptError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Arc<Vec<Entry>>,
}

impl Transcript {
    pub fn iter(&self) -> slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    pub fn pending(&self) -> Option<&Entry> {
        self.entries.last().filter(|entry| entry.is_pending)
    }

    /// Committed entries only, in creation order.
    pub fn committed(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.entries.iter().filter(|entry| !entry.is_pending)
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Entry;
    type IntoIter = slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Default)]
pub struct TranscriptStore {
    entries: Arc<Vec<Entry>>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Transcript {
        Transcript {
            entries: Arc::clone(&self.entries),
        }
    }

    pub fn append(&mut self, entry: Entry) -> Transcript {
        let entries = Arc::make_mut(&mut self.entries);
        match entries.last() {
            Some(tail) if tail.is_pending && !entry.is_pending => {
                let at = entries.len() - 1;
                entries.insert(at, entry);
            }
            _ => entries.push(entry),
        }
        self.snapshot()
    }

    pub fn replace_last(&mut self, entry: Entry) -> Result<Transcript, TranscriptError> {
        let entries = Arc::make_mut(&mut self.entries);
        let tail = entries.last_mut().ok_or(TranscriptError::Empty)?;
        *tail = entry;
        Ok(self.snapshot())
    }
}

#[cfg(test)]
#[path = "tests/transcript_tests.rs"]
mod tests;
