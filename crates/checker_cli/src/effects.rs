use std::io;
use std::sync::{mpsc, Arc};
use std::thread;

use checker_core::{Effect, Msg, Progress, Timestamp};
use checker_engine::{ApiError, CheckerApi, ClientEvent, ClientEvents, ClientHandle};
use checker_logging::{checker_debug, checker_info, checker_warn};
use chrono::Utc;

/// Hint appended when the backend suggests typing the description instead.
const MANUAL_INPUT_HINT: &str = "Pass the description with --job or --job-text instead.";

/// Executes core effects on the engine and feeds the outcomes back as
/// messages.
pub struct EffectRunner {
    client: ClientHandle,
    user_id: String,
}

impl EffectRunner {
    pub fn new(
        api: Arc<dyn CheckerApi>,
        user_id: String,
        msg_tx: mpsc::Sender<Msg>,
    ) -> io::Result<Self> {
        let (client, events) = ClientHandle::spawn(api, true)?;
        spawn_event_loop(events, msg_tx)?;
        Ok(Self { client, user_id })
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RunAnalysis { request, mode } => {
                    checker_info!(
                        "RunAnalysis mode={:?} cv_chars={} job_chars={}",
                        mode,
                        request.cv_markdown.chars().count(),
                        request.job_description.chars().count()
                    );
                    self.client.analyze(request, mode);
                }
                Effect::CancelAnalysis => self.client.cancel(),
                Effect::FetchJob { url } => {
                    checker_info!("FetchJob url={}", url);
                    self.client.fetch_job(url);
                }
                Effect::LoadHistory { limit } => {
                    self.client.load_history(self.user_id.clone(), limit);
                }
                Effect::CheckHealth => self.client.check_health(),
            }
        }
    }
}

fn spawn_event_loop(events: ClientEvents, msg_tx: mpsc::Sender<Msg>) -> io::Result<()> {
    thread::Builder::new()
        .name("checker-events".to_string())
        .spawn(move || {
            while let Some(event) = events.recv() {
                if msg_tx.send(map_event(event, Utc::now())).is_err() {
                    break;
                }
            }
            checker_debug!("engine event loop finished");
        })?;
    Ok(())
}

/// Turns an engine event into the message the store understands. Every
/// failure is absorbed here as a message.
pub(crate) fn map_event(event: ClientEvent, at: Timestamp) -> Msg {
    match event {
        ClientEvent::Progress(update) => Msg::UpdateProgress(Progress {
            current_step: update.step,
            total_steps: update.total_steps,
            message: update.message,
        }),
        ClientEvent::AnalysisFinished(Ok(result)) => Msg::CompleteAnalysis { result, at },
        ClientEvent::AnalysisFinished(Err(err)) => Msg::FailAnalysis(err.to_string()),
        ClientEvent::JobFetched {
            url,
            result: Ok(job),
        } => Msg::JobFetched {
            content: job.content,
            source_url: job.source_url.unwrap_or(url),
            at,
        },
        ClientEvent::JobFetched {
            url,
            result: Err(err),
        } => {
            checker_warn!("job fetch for {} failed: {}", url, err);
            Msg::JobFetchFailed {
                message: job_fetch_message(&err),
            }
        }
        ClientEvent::HistoryLoaded(Ok(page)) => Msg::HistoryLoaded(page.analyses),
        ClientEvent::HistoryLoaded(Err(err)) => Msg::HistoryLoadFailed {
            message: format!("Could not load history: {err}"),
        },
        ClientEvent::HealthChecked(Ok(status)) => {
            checker_info!(
                "backend status={} version={:?} azure_openai={:?}",
                status.status,
                status.version,
                status.azure_openai
            );
            Msg::HealthChecked {
                healthy: status.is_healthy(),
            }
        }
        ClientEvent::HealthChecked(Err(err)) => {
            checker_warn!("health check failed: {}", err);
            Msg::HealthChecked { healthy: false }
        }
    }
}

fn job_fetch_message(err: &ApiError) -> String {
    match err {
        ApiError::JobFetch {
            message, fallback, ..
        } if fallback == "manual_input" => format!("{message} {MANUAL_INPUT_HINT}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checker_core::{AnalysisResult, CANCELLED_MESSAGE};
    use checker_engine::{HistoryPage, JobSubmission, ProgressUpdate, StepStatus};
    use chrono::TimeZone;

    fn at() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 5, 4, 12, 0, 0).unwrap()
    }

    #[test]
    fn progress_maps_step_numbers() {
        let msg = map_event(
            ClientEvent::Progress(ProgressUpdate {
                step: 2,
                total_steps: 4,
                message: "Parsing CV...".into(),
                status: StepStatus::InProgress,
            }),
            at(),
        );
        assert_eq!(
            msg,
            Msg::UpdateProgress(Progress {
                current_step: 2,
                total_steps: 4,
                message: "Parsing CV...".into(),
            })
        );
    }

    #[test]
    fn finished_analysis_completes_or_fails() {
        let result: AnalysisResult =
            serde_json::from_str(r#"{"analysis_id":"a","overall_score":50}"#).unwrap();
        assert_eq!(
            map_event(ClientEvent::AnalysisFinished(Ok(result.clone())), at()),
            Msg::CompleteAnalysis { result, at: at() }
        );
        assert_eq!(
            map_event(ClientEvent::AnalysisFinished(Err(ApiError::Timeout)), at()),
            Msg::FailAnalysis("The request timed out".into())
        );
    }

    #[test]
    fn cancellation_fails_with_the_cancelled_message() {
        assert_eq!(
            map_event(ClientEvent::AnalysisFinished(Err(ApiError::Cancelled)), at()),
            Msg::FailAnalysis(CANCELLED_MESSAGE.into())
        );
    }

    #[test]
    fn fetched_job_falls_back_to_the_requested_url() {
        let msg = map_event(
            ClientEvent::JobFetched {
                url: "https://www.linkedin.com/jobs/view/1".into(),
                result: Ok(JobSubmission {
                    job_id: None,
                    content: "Rust engineer".into(),
                    source_type: checker_core::JobSource::LinkedinUrl,
                    source_url: None,
                    fetch_status: "success".into(),
                    character_count: None,
                }),
            },
            at(),
        );
        assert_eq!(
            msg,
            Msg::JobFetched {
                content: "Rust engineer".into(),
                source_url: "https://www.linkedin.com/jobs/view/1".into(),
                at: at(),
            }
        );
    }

    #[test]
    fn job_fetch_failure_suggests_manual_input() {
        let msg = map_event(
            ClientEvent::JobFetched {
                url: "https://www.linkedin.com/jobs/view/1".into(),
                result: Err(ApiError::JobFetch {
                    error: "scraping_failed".into(),
                    message: "Failed to fetch job description.".into(),
                    details: None,
                    fallback: "manual_input".into(),
                }),
            },
            at(),
        );
        assert_eq!(
            msg,
            Msg::JobFetchFailed {
                message: format!("Failed to fetch job description. {MANUAL_INPUT_HINT}")
            }
        );
    }

    #[test]
    fn health_errors_mean_unhealthy_and_history_unwraps() {
        assert_eq!(
            map_event(
                ClientEvent::HealthChecked(Err(ApiError::NoResponse {
                    message: "refused".into()
                })),
                at()
            ),
            Msg::HealthChecked { healthy: false }
        );
        assert_eq!(
            map_event(
                ClientEvent::HistoryLoaded(Ok(HistoryPage {
                    analyses: Vec::new(),
                    count: 0
                })),
                at()
            ),
            Msg::HistoryLoaded(Vec::new())
        );
    }
}
