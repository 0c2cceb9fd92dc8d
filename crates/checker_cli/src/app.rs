use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::sync::{mpsc, Arc};

use anyhow::{anyhow, Context};
use checker_core::validation::validate_file;
use checker_core::{JobFetchStatus, Msg, Store, CANCELLED_MESSAGE};
use checker_engine::ReqwestApi;
use checker_logging::checker_info;
use chrono::Utc;

use crate::cli::{AnalyzeArgs, ClearTarget, Command, JobArgs};
use crate::config::AppConfig;
use crate::effects::EffectRunner;
use crate::persistence::{load_snapshot, save_snapshot};
use crate::render::{self, ErrorHint, StatusBar};

pub fn run(command: Command, config: AppConfig) -> anyhow::Result<ExitCode> {
    let api = ReqwestApi::new(config.client.clone()).context("failed to set up the HTTP client")?;
    let (msg_tx, msg_rx) = mpsc::channel();
    let runner = EffectRunner::new(Arc::new(api), config.user_id.clone(), msg_tx)
        .context("failed to start the background client")?;

    let mut app = App::new(runner, msg_rx, config);
    app.restore();
    let code = match command {
        Command::Analyze(args) => app.analyze(args)?,
        Command::History { remote, limit } => app.history(remote, limit)?,
        Command::Show { id } => app.show(id.as_deref()),
        Command::Health => app.health()?,
        Command::Clear { target } => app.clear(target),
    };
    app.save();
    Ok(code)
}

struct App {
    store: Store,
    runner: EffectRunner,
    msg_rx: mpsc::Receiver<Msg>,
    status: StatusBar,
    config: AppConfig,
}

impl App {
    fn new(runner: EffectRunner, msg_rx: mpsc::Receiver<Msg>, config: AppConfig) -> Self {
        let mut store = Store::default();
        let status = StatusBar::new();
        store.subscribe(status.subscriber());
        Self {
            store,
            runner,
            msg_rx,
            status,
            config,
        }
    }

    fn restore(&mut self) {
        if let Some(snapshot) = load_snapshot(&self.config.state_dir) {
            self.send(Msg::RestoreSnapshot(snapshot));
        }
    }

    fn save(&self) {
        let snapshot = self.store.state().snapshot();
        if !save_snapshot(&self.config.state_dir, &snapshot) {
            eprintln!(
                "Warning: could not save state to {}",
                self.config.state_dir.display()
            );
        }
    }

    fn send(&mut self, msg: Msg) {
        let effects = self.store.send(msg);
        self.runner.run(effects);
    }

    /// Feeds engine messages into the store until one matching `done` has
    /// been applied.
    fn wait_until(&mut self, done: impl Fn(&Msg) -> bool) -> anyhow::Result<()> {
        loop {
            let msg = self
                .msg_rx
                .recv()
                .map_err(|_| anyhow!("background client stopped unexpectedly"))?;
            let finished = done(&msg);
            self.send(msg);
            if finished {
                return Ok(());
            }
        }
    }

    fn analyze(&mut self, args: AnalyzeArgs) -> anyhow::Result<ExitCode> {
        if let Some(path) = &args.cv {
            let (filename, content) = read_cv(path)?;
            self.send(Msg::UploadCv {
                filename,
                content,
                at: Utc::now(),
            });
        }
        if let Some(code) = self.apply_job_args(args.job)? {
            return Ok(code);
        }

        self.send(Msg::SubmitAnalysis {
            streaming: !args.no_stream,
        });
        let started = self.store.state().is_loading();
        if started {
            self.wait_until(|msg| {
                matches!(msg, Msg::CompleteAnalysis { .. } | Msg::FailAnalysis(_))
            })?;
        }
        self.status.clear();

        let state = self.store.state();
        match (state.error(), state.result()) {
            (Some(message), _) => {
                render::print_error(message, analysis_hint(started, message));
                Ok(ExitCode::FAILURE)
            }
            (None, Some(result)) => {
                render::print_result(result);
                Ok(ExitCode::SUCCESS)
            }
            (None, None) => Err(anyhow!("analysis ended without a result")),
        }
    }

    /// Returns an exit code when the job description could not be obtained.
    fn apply_job_args(&mut self, job: JobArgs) -> anyhow::Result<Option<ExitCode>> {
        let text = match (job.job, job.job_text, job.job_url) {
            (Some(path), _, _) => fs::read_to_string(&path)
                .with_context(|| format!("failed to read job description {}", path.display()))?,
            (_, Some(text), _) => text,
            (_, _, Some(url)) => return self.fetch_job(url),
            (None, None, None) => return Ok(None),
        };
        self.send(Msg::UpdateJobDescription {
            text,
            at: Utc::now(),
        });
        Ok(None)
    }

    fn fetch_job(&mut self, url: String) -> anyhow::Result<Option<ExitCode>> {
        self.send(Msg::FetchJobFromUrl { url });
        if matches!(self.store.state().job_fetch(), JobFetchStatus::Fetching { .. }) {
            self.wait_until(|msg| {
                matches!(msg, Msg::JobFetched { .. } | Msg::JobFetchFailed { .. })
            })?;
        }
        self.status.clear();

        if let JobFetchStatus::Failed { message } = self.store.state().job_fetch() {
            render::print_error(message, ErrorHint::FixInput);
            return Ok(Some(ExitCode::FAILURE));
        }
        if let Some(job) = self.store.state().job() {
            checker_info!(
                "using fetched job description ({} chars)",
                job.text.chars().count()
            );
        }
        Ok(None)
    }

    fn history(&mut self, remote: bool, limit: usize) -> anyhow::Result<ExitCode> {
        if remote {
            self.send(Msg::LoadHistory { limit });
            self.wait_until(|msg| {
                matches!(msg, Msg::HistoryLoaded(_) | Msg::HistoryLoadFailed { .. })
            })?;
            if let Some(message) = self.store.state().error() {
                render::print_error(message, ErrorHint::Retry);
                return Ok(ExitCode::FAILURE);
            }
        }
        let view = self.store.view();
        let shown = limit.min(view.history.len());
        render::print_history(&view.history[..shown]);
        Ok(ExitCode::SUCCESS)
    }

    fn show(&self, id: Option<&str>) -> ExitCode {
        let history = self.store.state().history();
        let entry = match id {
            Some(id) => history.get(id),
            None => history.latest(),
        };
        match entry {
            Some(entry) => {
                println!(
                    "{} analysed on {}",
                    entry.cv_filename,
                    entry.timestamp.format("%Y-%m-%d %H:%M UTC")
                );
                render::print_result(&entry.result);
                ExitCode::SUCCESS
            }
            None => {
                let message = match id {
                    Some(id) => format!("no analysis with id {id} in history"),
                    None => "history is empty".to_string(),
                };
                render::print_error(&message, ErrorHint::ListHistory);
                ExitCode::FAILURE
            }
        }
    }

    fn health(&mut self) -> anyhow::Result<ExitCode> {
        self.send(Msg::CheckHealth);
        self.wait_until(|msg| matches!(msg, Msg::HealthChecked { .. }))?;
        let healthy = self.store.state().backend_healthy() == Some(true);
        render::print_health(healthy, &self.config.client.base_url);
        Ok(if healthy {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }

    fn clear(&mut self, target: ClearTarget) -> ExitCode {
        let (msg, what) = match target {
            ClearTarget::Cv => (Msg::ClearCv, "CV"),
            ClearTarget::Job => (Msg::ClearJob, "job description"),
            ClearTarget::All => (Msg::ResetState, "CV, job description and history"),
        };
        self.send(msg);
        println!("Cleared saved {what}.");
        ExitCode::SUCCESS
    }
}

/// Errors raised before submission come from local validation; the rest
/// came back from the backend.
fn analysis_hint(started: bool, message: &str) -> ErrorHint {
    if !started {
        ErrorHint::FixInput
    } else if message == CANCELLED_MESSAGE {
        ErrorHint::Cancelled
    } else {
        ErrorHint::Retry
    }
}

/// Validates and reads a Markdown CV, returning its file name and content.
fn read_cv(path: &Path) -> anyhow::Result<(String, String)> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("{} is not a file", path.display()))?;
    let size = fs::metadata(path)
        .with_context(|| format!("failed to open CV {}", path.display()))?
        .len();
    validate_file(&filename, size)?;
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read CV {}", path.display()))?;
    Ok((filename, content))
}
