// Layered settings: built-in defaults -> TOML file -> HELPDESK_* environment

use anyhow::{Context, Result};
use directories::{ProjectDirs, UserDirs};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use helpdesk_core::application::constants::{
    DEFAULT_POLL_INTERVAL, DEFAULT_PROBE_TIMEOUT, DEFAULT_RETRY_DELAY,
};
use helpdesk_core::application::RetryPolicy;

const ENV_PREFIX: &str = "HELPDESK";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Parent of every report directory
    pub output_root: PathBuf,
    pub poll_interval_ms: u64,
    /// 0 disables the per-probe timeout
    pub probe_timeout_secs: u64,
    pub probe_attempts: u32,
    pub retry_delay_ms: u64,
    /// Volume the live poller reports usage for
    pub disk_mount: PathBuf,
    pub log_format: LogFormat,
    pub log_filter: String,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Settings {
    /// Load settings
    ///
    /// `explicit` must exist when given; the per-user file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (file, required) = match explicit {
            Some(path) => (Some(path.to_path_buf()), true),
            None => (default_config_file(), false),
        };

        let mut builder = config::Config::builder()
            .set_default("output_root", default_output_root().to_string_lossy().into_owned())?
            .set_default("poll_interval_ms", DEFAULT_POLL_INTERVAL.as_millis() as u64)?
            .set_default("probe_timeout_secs", DEFAULT_PROBE_TIMEOUT.as_secs())?
            .set_default("probe_attempts", 1_u64)?
            .set_default("retry_delay_ms", DEFAULT_RETRY_DELAY.as_millis() as u64)?
            .set_default("disk_mount", default_disk_mount())?
            .set_default("log_format", "pretty")?
            .set_default("log_filter", "helpdesk=warn")?;

        if let Some(file) = &file {
            builder = builder.add_source(config::File::from(file.as_path()).required(required));
        }

        let mut settings: Settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        settings.output_root = expand(&settings.output_root);
        settings.log_dir = settings.log_dir.as_deref().map(expand);
        Ok(settings)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn probe_timeout(&self) -> Option<Duration> {
        (self.probe_timeout_secs > 0).then(|| Duration::from_secs(self.probe_timeout_secs))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.probe_attempts, Duration::from_millis(self.retry_delay_ms))
    }
}

fn default_config_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "helpdesk").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Desktop, else home, else the working directory
fn default_output_root() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| {
            dirs.desktop_dir()
                .map(Path::to_path_buf)
                .or_else(|| Some(dirs.home_dir().to_path_buf()))
        })
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_disk_mount() -> &'static str {
    if cfg!(windows) {
        "C:\\"
    } else {
        "/"
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
