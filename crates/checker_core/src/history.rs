use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::HistoryEntry;

/// Cap for history kept on this machine.
pub const LOCAL_HISTORY_CAP: usize = 10;
/// Cap for history pulled from the backend.
pub const BACKEND_HISTORY_CAP: usize = 20;

/// Where the current entries came from. Decides how many are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistorySource {
    #[default]
    Local,
    Backend,
}

/// Bounded, newest-first list of completed analyses.
///
/// `cap` bounds local completions. A page loaded from the backend may hold
/// up to [`BACKEND_HISTORY_CAP`] entries until the next local completion.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    cap: usize,
    source: HistorySource,
}

impl Default for History {
    fn default() -> Self {
        Self::with_cap(LOCAL_HISTORY_CAP)
    }
}

impl History {
    pub fn with_cap(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            entries: VecDeque::with_capacity(cap),
            cap,
            source: HistorySource::Local,
        }
    }

    /// Cap applied to local completions.
    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn source(&self) -> HistorySource {
        self.source
    }

    /// Most entries kept for the current source.
    pub fn limit(&self) -> usize {
        match self.source {
            HistorySource::Local => self.cap,
            HistorySource::Backend => BACKEND_HISTORY_CAP.max(self.cap),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Adds the newest entry, evicting from the old end past the cap.
    /// Returns how many entries were evicted.
    /// The list becomes local again, so it is trimmed back to `cap`.
    pub fn push(&mut self, entry: HistoryEntry) -> usize {
        self.source = HistorySource::Local;
        self.entries.push_front(entry);
        self.evict_overflow()
    }

    /// Replaces all entries, ordering them newest first and keeping at most
    /// the limit for `source`.
    pub fn replace(&mut self, mut entries: Vec<HistoryEntry>, source: HistorySource) {
        self.source = source;
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(self.limit());
        self.entries = entries.into();
    }

    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    fn evict_overflow(&mut self) -> usize {
        let mut evicted = 0;
        while self.entries.len() > self.limit() {
            self.entries.pop_back();
            evicted += 1;
        }
        evicted
    }
}
