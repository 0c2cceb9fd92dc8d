//! Logger setup for the `cv-checker` binary.
//!
//! Terminal output goes to stderr so reports on stdout stay clean. The
//! optional file log is `cv-checker.log` in the state directory.

use std::fs::{self, File};
use std::path::PathBuf;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

const LOG_FILENAME: &str = "cv-checker.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDestination {
    Terminal,
    /// Terminal plus the log file.
    Both,
}

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub level: LevelFilter,
    pub destination: LogDestination,
    pub dir: PathBuf,
}

pub fn initialize(settings: &LogSettings) {
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        settings.level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if settings.destination == LogDestination::Both {
        // The file captures debug detail even when the terminal stays quiet.
        let file_level = settings.level.max(LevelFilter::Debug);
        if let Some(file_logger) = create_file_logger(settings, file_level, config) {
            loggers.push(file_logger);
        }
    }

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .add_filter_allow_str("checker_")
        .add_filter_allow_str("cv_checker")
        .build()
}

fn create_file_logger(
    settings: &LogSettings,
    level: LevelFilter,
    config: Config,
) -> Option<Box<WriteLogger<File>>> {
    let log_path = settings.dir.join(LOG_FILENAME);
    let file = fs::create_dir_all(&settings.dir).and_then(|()| File::create(&log_path));
    match file {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", log_path, err);
            None
        }
    }
}
