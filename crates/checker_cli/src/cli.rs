use std::path::PathBuf;

use checker_engine::DEFAULT_BASE_URL;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Match a Markdown CV against a job description using the CV Checker backend.
#[derive(Debug, Parser)]
#[command(name = "cv-checker", version)]
pub struct Cli {
    /// Backend base URL.
    #[arg(long, global = true, env = "CV_CHECKER_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Directory holding the saved CV, job description and history.
    #[arg(long, global = true, env = "CV_CHECKER_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// User id sent with history requests.
    #[arg(long, global = true, env = "CV_CHECKER_USER_ID", default_value = "anonymous")]
    pub user_id: String,

    /// Log level: off, error, warn, info, debug or trace.
    #[arg(long, global = true, env = "CV_CHECKER_LOG", default_value = "warn")]
    pub log_level: String,

    /// Also write logs to cv-checker.log in the state directory.
    #[arg(long, global = true)]
    pub log_file: bool,

    /// Extra attempts for transient failures.
    #[arg(long, global = true, default_value_t = 2)]
    pub retries: u32,

    /// Ceiling for a whole analysis, in seconds.
    #[arg(long, global = true, value_name = "SECS", default_value_t = 120)]
    pub analysis_timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a CV against a job description.
    Analyze(AnalyzeArgs),
    /// List past analyses.
    History {
        /// Load the history stored by the backend instead of the local one.
        #[arg(long)]
        remote: bool,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Print a full report from history; the latest one by default.
    Show { id: Option<String> },
    /// Check that the backend is reachable and healthy.
    Health,
    /// Forget the saved CV, job description, or everything.
    Clear {
        #[arg(value_enum, default_value_t = ClearTarget::All)]
        target: ClearTarget,
    },
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Markdown CV. Defaults to the CV from the previous run.
    #[arg(long, value_name = "FILE")]
    pub cv: Option<PathBuf>,

    #[command(flatten)]
    pub job: JobArgs,

    /// Use the single-response endpoint instead of streaming progress.
    #[arg(long)]
    pub no_stream: bool,
}

/// Where the job description comes from. Defaults to the saved one.
#[derive(Debug, Args)]
#[group(multiple = false)]
pub struct JobArgs {
    /// Text file with the job description.
    #[arg(long, value_name = "FILE")]
    pub job: Option<PathBuf>,

    /// Job description given inline.
    #[arg(long, value_name = "TEXT")]
    pub job_text: Option<String>,

    /// LinkedIn job posting to fetch through the backend.
    #[arg(long, value_name = "URL")]
    pub job_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClearTarget {
    Cv,
    Job,
    All,
}
