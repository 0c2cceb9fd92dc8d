use crate::{AnalysisResult, HistoryEntry, JobInputMode, PersistedSnapshot, Progress, Timestamp, View};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// A CV file passed validation and was read.
    UploadCv {
        filename: String,
        content: String,
        at: Timestamp,
    },
    /// User removed the current CV.
    ClearCv,
    /// User edited the job description text.
    UpdateJobDescription { text: String, at: Timestamp },
    /// User removed the job description.
    ClearJob,
    /// User switched between typing the description and fetching it by URL.
    SetJobInputMode(JobInputMode),
    /// Mark an analysis as started. Ignored while one is already running.
    StartAnalysis,
    /// Backend reported progress for the running analysis.
    UpdateProgress(Progress),
    /// Backend delivered the final report.
    CompleteAnalysis { result: AnalysisResult, at: Timestamp },
    /// The running analysis failed; the message is shown to the user.
    FailAnalysis(String),
    /// Drop the current result, error and progress.
    ClearAnalysis,
    SetCurrentView(View),
    /// Back to defaults, keeping the configured history cap.
    ResetState,
    /// User asked to analyze the current CV against the current job.
    SubmitAnalysis { streaming: bool },
    /// User asked to abort the running analysis.
    CancelAnalysis,
    /// User asked the backend to fetch a job description from a LinkedIn URL.
    FetchJobFromUrl { url: String },
    /// Backend fetched the job description.
    JobFetched {
        content: String,
        source_url: String,
        at: Timestamp,
    },
    JobFetchFailed { message: String },
    /// Ask the backend for its stored history.
    LoadHistory { limit: usize },
    HistoryLoaded(Vec<HistoryEntry>),
    HistoryLoadFailed { message: String },
    CheckHealth,
    HealthChecked { healthy: bool },
    /// Restore state saved by a previous run.
    RestoreSnapshot(PersistedSnapshot),
    /// Changes nothing; the store does not notify subscribers for it.
    NoOp,
}
