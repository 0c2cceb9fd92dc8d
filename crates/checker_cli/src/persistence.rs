use std::path::Path;

use checker_core::PersistedSnapshot;
use checker_engine::StateFile;
use checker_logging::{checker_error, checker_info, checker_warn};

const STATE_FILENAME: &str = "state.ron";

pub(crate) fn state_file(state_dir: &Path) -> StateFile {
    StateFile::new(state_dir.join(STATE_FILENAME))
}

/// Reads the snapshot saved by a previous run. A missing, unreadable or
/// unparsable file counts as no snapshot.
pub(crate) fn load_snapshot(state_dir: &Path) -> Option<PersistedSnapshot> {
    let file = state_file(state_dir);
    let content = match file.read() {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(err) => {
            checker_warn!("Failed to read saved state from {:?}: {}", file.path(), err);
            return None;
        }
    };

    match ron::from_str::<PersistedSnapshot>(&content) {
        Ok(snapshot) => {
            checker_info!(
                "Loaded saved state v{} from {:?}",
                snapshot.version,
                file.path()
            );
            Some(snapshot)
        }
        Err(err) => {
            checker_warn!("Failed to parse saved state from {:?}: {}", file.path(), err);
            None
        }
    }
}

/// Returns false when the snapshot could not be written; the reason is
/// logged.
pub(crate) fn save_snapshot(state_dir: &Path, snapshot: &PersistedSnapshot) -> bool {
    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(snapshot, pretty) {
        Ok(text) => text,
        Err(err) => {
            checker_error!("Failed to serialize state: {}", err);
            return false;
        }
    };

    let file = state_file(state_dir);
    match file.write(&content) {
        Ok(()) => true,
        Err(err) => {
            checker_error!("Failed to write state to {:?}: {}", file.path(), err);
            false
        }
    }
}
