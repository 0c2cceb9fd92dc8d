use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use checker_engine::ClientSettings;
use url::Url;

use crate::cli::Cli;
use crate::logging::{LogDestination, LogSettings};

const APP_DIR: &str = "cv-checker";

/// Everything the run needs, resolved from flags, environment and defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client: ClientSettings,
    pub state_dir: PathBuf,
    pub user_id: String,
    pub logging: LogSettings,
}

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let api_url = cli.api_url.trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&api_url)
            .with_context(|| format!("invalid backend URL {api_url:?}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("backend URL must use http or https, got {api_url:?}");
        }
        if cli.user_id.trim().is_empty() {
            bail!("user id must not be empty");
        }

        let state_dir = cli.state_dir.clone().unwrap_or_else(default_state_dir);
        let client = ClientSettings {
            base_url: api_url,
            max_retries: cli.retries,
            analysis_timeout: Duration::from_secs(cli.analysis_timeout.max(1)),
            ..ClientSettings::default()
        };
        let logging = LogSettings {
            level: checker_logging::parse_level(&cli.log_level),
            destination: if cli.log_file {
                LogDestination::Both
            } else {
                LogDestination::Terminal
            },
            dir: state_dir.clone(),
        };

        Ok(Self {
            client,
            state_dir,
            user_id: cli.user_id.trim().to_string(),
            logging,
        })
    }
}

/// `<local data dir>/cv-checker`, or `./.cv-checker` where the platform has
/// no such directory.
pub fn default_state_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(format!(".{APP_DIR}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["cv-checker"];
        argv.extend_from_slice(args);
        argv.push("health");
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn flags_override_client_defaults() {
        let cli = parse(&[
            "--api-url",
            "https://cv.example.com/api/v1/",
            "--retries",
            "0",
            "--analysis-timeout",
            "300",
            "--state-dir",
            "/tmp/cv-state",
        ]);
        let config = AppConfig::from_cli(&cli).unwrap();
        assert_eq!(config.client.base_url, "https://cv.example.com/api/v1");
        assert_eq!(config.client.max_retries, 0);
        assert_eq!(config.client.analysis_timeout, Duration::from_secs(300));
        assert_eq!(config.client.health_timeout, Duration::from_secs(5));
        assert_eq!(config.state_dir, PathBuf::from("/tmp/cv-state"));
        assert_eq!(config.logging.dir, config.state_dir);
    }

    #[test]
    fn non_http_backend_is_rejected() {
        let cli = parse(&["--api-url", "ftp://example.com"]);
        assert!(AppConfig::from_cli(&cli).is_err());
    }

    #[test]
    fn default_state_dir_is_namespaced() {
        let dir = default_state_dir();
        assert!(dir.to_string_lossy().ends_with(APP_DIR));
    }
}
