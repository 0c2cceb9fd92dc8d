use crate::validation::validate_linkedin_url;
use crate::{AnalysisMode, AppState, Effect, JobSource, Msg};

pub const CANCELLED_MESSAGE: &str = "Analysis cancelled";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UploadCv {
            filename,
            content,
            at,
        } => {
            state.set_cv(filename, content, at);
            Vec::new()
        }
        Msg::ClearCv => {
            state.clear_cv();
            Vec::new()
        }
        Msg::UpdateJobDescription { text, at } => {
            state.set_job_text(text, at, JobSource::Manual, None);
            Vec::new()
        }
        Msg::ClearJob => {
            state.clear_job();
            Vec::new()
        }
        Msg::SetJobInputMode(mode) => {
            state.set_job_input_mode(mode);
            Vec::new()
        }
        Msg::StartAnalysis => {
            state.start_analysis();
            Vec::new()
        }
        Msg::UpdateProgress(progress) => {
            state.set_progress(progress);
            Vec::new()
        }
        Msg::CompleteAnalysis { result, at } => {
            state.complete_analysis(result, at);
            Vec::new()
        }
        Msg::FailAnalysis(message) => {
            state.fail_analysis(message);
            Vec::new()
        }
        Msg::ClearAnalysis => {
            state.clear_analysis();
            Vec::new()
        }
        Msg::SetCurrentView(view) => {
            state.set_view(view);
            Vec::new()
        }
        Msg::ResetState => {
            state.reset();
            Vec::new()
        }
        Msg::SubmitAnalysis { streaming } => {
            // One analysis at a time; a second submit is dropped, not queued.
            if state.is_loading() {
                return (state, Vec::new());
            }
            match state.analysis_request() {
                Ok(request) => {
                    state.start_analysis();
                    let mode = if streaming {
                        AnalysisMode::Streaming
                    } else {
                        AnalysisMode::Blocking
                    };
                    vec![Effect::RunAnalysis { request, mode }]
                }
                Err(message) => {
                    state.set_error(message);
                    Vec::new()
                }
            }
        }
        Msg::CancelAnalysis => {
            if state.is_loading() {
                state.fail_analysis(CANCELLED_MESSAGE.to_string());
                vec![Effect::CancelAnalysis]
            } else {
                Vec::new()
            }
        }
        Msg::FetchJobFromUrl { url } => {
            if state.is_fetching_job() {
                return (state, Vec::new());
            }
            match validate_linkedin_url(&url) {
                Ok(normalized) => {
                    state.start_job_fetch(normalized.clone());
                    vec![Effect::FetchJob { url: normalized }]
                }
                Err(err) => {
                    state.fail_job_fetch(err.to_string());
                    Vec::new()
                }
            }
        }
        Msg::JobFetched {
            content,
            source_url,
            at,
        } => {
            state.finish_job_fetch(content, source_url, at);
            Vec::new()
        }
        Msg::JobFetchFailed { message } => {
            state.fail_job_fetch(message);
            Vec::new()
        }
        Msg::LoadHistory { limit } => vec![Effect::LoadHistory { limit }],
        Msg::HistoryLoaded(entries) => {
            state.load_backend_history(entries);
            Vec::new()
        }
        Msg::HistoryLoadFailed { message } => {
            state.set_error(message);
            Vec::new()
        }
        Msg::CheckHealth => vec![Effect::CheckHealth],
        Msg::HealthChecked { healthy } => {
            state.set_backend_healthy(healthy);
            Vec::new()
        }
        Msg::RestoreSnapshot(snapshot) => {
            state.restore(snapshot);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
