use crate::history::{History, HistorySource};
use crate::validation::{validate_cv_content, validate_job_description};
use crate::view_model::{AppViewModel, HistoryRowView, ProgressView, ResultView};
use crate::{
    AnalysisRequest, AnalysisResult, CvRecord, HistoryEntry, JobDescription, JobFetchStatus,
    JobInputMode, JobSource, PersistedSnapshot, Progress, Timestamp, View, STATE_VERSION,
};

/// Filename recorded in history when a report arrives without a CV loaded.
pub const UNKNOWN_CV_FILENAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    cv: Option<CvRecord>,
    job: Option<JobDescription>,
    job_input_mode: JobInputMode,
    is_loading: bool,
    progress: Option<Progress>,
    result: Option<AnalysisResult>,
    error: Option<String>,
    current_view: View,
    history: History,
    job_fetch: JobFetchStatus,
    backend_healthy: Option<bool>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history_cap(cap: usize) -> Self {
        Self {
            history: History::with_cap(cap),
            ..Self::default()
        }
    }

    pub fn cv(&self) -> Option<&CvRecord> {
        self.cv.as_ref()
    }

    pub fn job(&self) -> Option<&JobDescription> {
        self.job.as_ref()
    }

    pub fn job_input_mode(&self) -> JobInputMode {
        self.job_input_mode
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn current_view(&self) -> View {
        self.current_view
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn job_fetch(&self) -> &JobFetchStatus {
        &self.job_fetch
    }

    pub fn backend_healthy(&self) -> Option<bool> {
        self.backend_healthy
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            cv_filename: self.cv.as_ref().map(|cv| cv.filename.clone()),
            cv_chars: self.cv.as_ref().map_or(0, |cv| cv.content.chars().count()),
            job_chars: self.job.as_ref().map_or(0, |job| job.text.chars().count()),
            job_source: self.job.as_ref().map(|job| job.source_type),
            job_source_url: self.job.as_ref().and_then(|job| job.source_url.clone()),
            job_input_mode: self.job_input_mode,
            job_fetch: self.job_fetch.clone(),
            is_loading: self.is_loading,
            progress: self.progress.as_ref().map(|progress| ProgressView {
                current_step: progress.current_step,
                total_steps: progress.total_steps,
                message: progress.message.clone(),
                percent: progress.percent(),
            }),
            error: self.error.clone(),
            result: self.result.as_ref().map(|result| ResultView {
                analysis_id: result.analysis_id.clone(),
                overall_score: result.overall_score,
                matched_skills: result
                    .skill_matches
                    .iter()
                    .filter(|skill| skill.candidate_has)
                    .count(),
                total_skills: result.skill_matches.len(),
                strengths: result.strengths.clone(),
                gaps: result.gaps.clone(),
                recommendations: result.recommendations.clone(),
            }),
            current_view: self.current_view,
            history: self
                .history
                .iter()
                .map(|entry| HistoryRowView {
                    id: entry.id.clone(),
                    timestamp: entry.timestamp,
                    cv_filename: entry.cv_filename.clone(),
                    score: entry.score,
                })
                .collect(),
            backend_healthy: self.backend_healthy,
        }
    }

    /// Returns whether state changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn snapshot(&self) -> PersistedSnapshot {
        PersistedSnapshot {
            version: STATE_VERSION,
            cv: self.cv.clone(),
            job: self.job.clone(),
            history: self.history.to_vec(),
            history_source: self.history.source(),
        }
    }

    /// Builds the backend request from the current CV and job description.
    pub fn analysis_request(&self) -> Result<AnalysisRequest, String> {
        let cv = self
            .cv
            .as_ref()
            .ok_or_else(|| "Please upload a CV before starting the analysis".to_string())?;
        let job = self
            .job
            .as_ref()
            .ok_or_else(|| "Please provide a job description before starting the analysis".to_string())?;
        validate_cv_content(&cv.content).map_err(|err| err.to_string())?;
        validate_job_description(&job.text).map_err(|err| err.to_string())?;

        Ok(AnalysisRequest {
            cv_markdown: cv.content.clone(),
            job_description: job.text.clone(),
            cv_filename: Some(cv.filename.clone()),
            source_type: Some(job.source_type),
            source_url: job.source_url.clone(),
        })
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_cv(&mut self, filename: String, content: String, at: Timestamp) {
        self.cv = Some(CvRecord {
            filename,
            content,
            uploaded_at: at,
        });
        self.mark_dirty();
    }

    pub(crate) fn clear_cv(&mut self) {
        if self.cv.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn set_job_text(
        &mut self,
        text: String,
        at: Timestamp,
        source_type: JobSource,
        source_url: Option<String>,
    ) {
        self.job = Some(JobDescription {
            text,
            last_modified: at,
            source_type,
            source_url,
        });
        self.mark_dirty();
    }

    pub(crate) fn clear_job(&mut self) {
        let had_job = self.job.take().is_some();
        let had_fetch = std::mem::take(&mut self.job_fetch) != JobFetchStatus::Idle;
        if had_job || had_fetch {
            self.mark_dirty();
        }
    }

    pub(crate) fn set_job_input_mode(&mut self, mode: JobInputMode) {
        if self.job_input_mode != mode {
            self.job_input_mode = mode;
            self.mark_dirty();
        }
    }

    /// Returns false when an analysis is already running.
    pub(crate) fn start_analysis(&mut self) -> bool {
        if self.is_loading {
            return false;
        }
        self.is_loading = true;
        self.error = None;
        self.result = None;
        self.progress = None;
        self.mark_dirty();
        true
    }

    /// Returns false when no analysis is running.
    pub(crate) fn set_progress(&mut self, progress: Progress) -> bool {
        if !self.is_loading {
            return false;
        }
        self.progress = Some(progress);
        self.mark_dirty();
        true
    }

    pub(crate) fn complete_analysis(&mut self, result: AnalysisResult, at: Timestamp) {
        let cv_filename = self
            .cv
            .as_ref()
            .map_or_else(|| UNKNOWN_CV_FILENAME.to_string(), |cv| cv.filename.clone());
        self.history.push(HistoryEntry {
            id: result.analysis_id.clone(),
            timestamp: at,
            cv_filename,
            score: result.overall_score,
            result: result.clone(),
        });
        self.result = Some(result);
        self.is_loading = false;
        self.progress = None;
        self.error = None;
        self.current_view = View::Results;
        self.mark_dirty();
    }

    pub(crate) fn fail_analysis(&mut self, message: String) {
        self.error = Some(message);
        self.is_loading = false;
        self.progress = None;
        self.mark_dirty();
    }

    pub(crate) fn clear_analysis(&mut self) {
        self.result = None;
        self.error = None;
        self.progress = None;
        self.is_loading = false;
        self.mark_dirty();
    }

    pub(crate) fn set_error(&mut self, message: String) {
        self.error = Some(message);
        self.mark_dirty();
    }

    pub(crate) fn set_view(&mut self, view: View) {
        if self.current_view != view {
            self.current_view = view;
            self.mark_dirty();
        }
    }

    pub(crate) fn reset(&mut self) {
        let cap = self.history.cap();
        *self = Self::with_history_cap(cap);
        self.mark_dirty();
    }

    pub(crate) fn start_job_fetch(&mut self, url: String) {
        self.job_input_mode = JobInputMode::LinkedinUrl;
        self.job_fetch = JobFetchStatus::Fetching { url };
        self.mark_dirty();
    }

    pub(crate) fn is_fetching_job(&self) -> bool {
        matches!(self.job_fetch, JobFetchStatus::Fetching { .. })
    }

    pub(crate) fn finish_job_fetch(&mut self, content: String, source_url: String, at: Timestamp) {
        self.job_fetch = JobFetchStatus::Idle;
        self.set_job_text(content, at, JobSource::LinkedinUrl, Some(source_url));
    }

    /// The fetch failed; the user is sent back to manual input.
    pub(crate) fn fail_job_fetch(&mut self, message: String) {
        self.job_fetch = JobFetchStatus::Failed { message };
        self.job_input_mode = JobInputMode::Manual;
        self.mark_dirty();
    }

    /// Takes a page loaded from the backend.
    pub(crate) fn load_backend_history(&mut self, entries: Vec<HistoryEntry>) {
        self.history.replace(entries, HistorySource::Backend);
        self.mark_dirty();
    }

    pub(crate) fn set_backend_healthy(&mut self, healthy: bool) {
        self.backend_healthy = Some(healthy);
        self.mark_dirty();
    }

    /// Applies a persisted snapshot. A snapshot from another schema version
    /// is discarded and the state falls back to defaults.
    pub(crate) fn restore(&mut self, snapshot: PersistedSnapshot) -> bool {
        let cap = self.history.cap();
        *self = Self::with_history_cap(cap);
        self.mark_dirty();
        if !snapshot.is_current() {
            return false;
        }
        self.cv = snapshot.cv;
        self.job = snapshot.job;
        self.history.replace(snapshot.history, snapshot.history_source);
        true
    }
}
