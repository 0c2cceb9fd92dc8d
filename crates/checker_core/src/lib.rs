//! CV Checker core: pure state machine, validation and view-model helpers.
mod effect;
mod history;
mod msg;
mod snapshot;
mod state;
mod store;
mod types;
mod update;
pub mod validation;
mod view_model;

pub use effect::{AnalysisMode, Effect};
pub use history::{History, HistorySource, BACKEND_HISTORY_CAP, LOCAL_HISTORY_CAP};
pub use msg::Msg;
pub use snapshot::{PersistedSnapshot, STATE_VERSION};
pub use state::{AppState, UNKNOWN_CV_FILENAME};
pub use store::{Store, Subscriber, SubscriptionId};
pub use types::{
    AnalysisRequest, AnalysisResult, CvRecord, HistoryEntry, JobDescription, JobFetchStatus,
    JobInputMode, JobSource, Progress, SkillMatch, Timestamp, View,
};
pub use update::{update, CANCELLED_MESSAGE};
pub use validation::ValidationError;
pub use view_model::{AppViewModel, HistoryRowView, ProgressView, ResultView};
