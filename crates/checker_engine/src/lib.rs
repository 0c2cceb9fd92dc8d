//! Checker engine: backend client, analysis stream and state file IO.
mod api;
mod engine;
mod http;
mod persist;
mod response_error;
mod stream;
mod types;

pub use api::{CheckerApi, ReqwestApi};
pub use engine::{ClientEvents, ClientHandle};
pub use http::{ClientSettings, HttpClient, DEFAULT_BASE_URL};
pub use persist::{ensure_state_dir, PersistError, StateFile};
pub use stream::{
    decode_event, read_analysis_stream, ChannelProgressSink, LineDecoder, NullProgressSink,
    ProgressSink, StreamEvent, DEFAULT_MAX_LINE_BYTES,
};
pub use types::{
    ApiError, ClientEvent, FieldError, HealthStatus, HistoryPage, JobSubmission, ProgressUpdate,
    StepStatus,
};
