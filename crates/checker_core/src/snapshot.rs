use serde::{Deserialize, Serialize};

use crate::{CvRecord, HistoryEntry, HistorySource, JobDescription};

/// Schema version of [`PersistedSnapshot`]. Bump on any incompatible change;
/// snapshots carrying another version are discarded on restore.
pub const STATE_VERSION: u32 = 2;

/// Subset of the state that survives a restart.
///
/// Analysis status, progress, errors and the current view are transient and
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub version: u32,
    #[serde(default)]
    pub cv: Option<CvRecord>,
    #[serde(default)]
    pub job: Option<JobDescription>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// Restoring keeps as many entries as this source allows.
    #[serde(default)]
    pub history_source: HistorySource,
}

impl Default for PersistedSnapshot {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            cv: None,
            job: None,
            history: Vec::new(),
            history_source: HistorySource::Local,
        }
    }
}

impl PersistedSnapshot {
    pub fn is_current(&self) -> bool {
        self.version == STATE_VERSION
    }
}
