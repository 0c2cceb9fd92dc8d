use std::fmt;

use checker_core::{AnalysisResult, HistoryEntry, JobSource};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    InProgress,
    Completed,
}

/// One `progress` line of the analysis stream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProgressUpdate {
    pub step: u32,
    pub total_steps: u32,
    #[serde(default)]
    pub message: String,
    pub status: StepStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Progress(ProgressUpdate),
    AnalysisFinished(Result<AnalysisResult, ApiError>),
    JobFetched {
        url: String,
        result: Result<JobSubmission, ApiError>,
    },
    HistoryLoaded(Result<HistoryPage, ApiError>),
    HealthChecked(Result<HealthStatus, ApiError>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub azure_openai: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryPage {
    #[serde(alias = "entries", alias = "history")]
    pub analyses: Vec<HistoryEntry>,
    #[serde(default, alias = "total")]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobSubmission {
    #[serde(default)]
    pub job_id: Option<String>,
    pub content: String,
    pub source_type: JobSource,
    #[serde(default)]
    pub source_url: Option<String>,
    pub fetch_status: String,
    #[serde(default)]
    pub character_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// 422 from the backend, with per-field detail when it was provided.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },
    /// Any other 4xx except 429. The server message is shown verbatim.
    #[error("{message}")]
    Request { status: u16, message: String },
    /// 5xx or 429 that outlived the retries.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("Unable to connect to the server. Please check that the backend is running ({message})")]
    NoResponse { message: String },
    #[error("The request timed out")]
    Timeout,
    #[error("Analysis cancelled")]
    Cancelled,
    #[error("Invalid analysis stream: {0}")]
    StreamProtocol(String),
    #[error("Analysis failed: {0}")]
    StreamServer(String),
    #[error("Could not decode the server response: {0}")]
    Decode(String),
    /// Structured failure from `/jobs`; `fallback` names the suggested
    /// alternative input method.
    #[error("{message}")]
    JobFetch {
        error: String,
        message: String,
        details: Option<String>,
        fallback: String,
    },
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Failures worth another attempt: no response at all, 5xx and 429.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::NoResponse { .. } | ApiError::Server { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Validation { .. } => Some(422),
            ApiError::Request { status, .. } | ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}
