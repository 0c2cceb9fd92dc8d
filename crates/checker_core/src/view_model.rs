use crate::{JobFetchStatus, JobInputMode, JobSource, Timestamp, View};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub cv_filename: Option<String>,
    pub cv_chars: usize,
    pub job_chars: usize,
    pub job_source: Option<JobSource>,
    pub job_source_url: Option<String>,
    pub job_input_mode: JobInputMode,
    pub job_fetch: JobFetchStatus,
    pub is_loading: bool,
    pub progress: Option<ProgressView>,
    pub error: Option<String>,
    pub result: Option<ResultView>,
    pub current_view: View,
    pub history: Vec<HistoryRowView>,
    pub backend_healthy: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub current_step: u32,
    pub total_steps: u32,
    pub message: String,
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub analysis_id: String,
    pub overall_score: f64,
    pub matched_skills: usize,
    pub total_skills: usize,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRowView {
    pub id: String,
    pub timestamp: Timestamp,
    pub cv_filename: String,
    pub score: f64,
}
