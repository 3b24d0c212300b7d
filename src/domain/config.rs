//! # Configuration
//!
//! Manages the loading and parsing of the server's configuration file (`config.yaml`).
//! Defines the allow-list, per-operation timeouts, executable overrides and logging settings.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main server configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct AppConfig {
    /// Directories under which filesystem operations are permitted.
    #[serde(default)]
    pub allowed_paths: Vec<PathBuf>,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub executables: ExecutablesConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Timeouts in seconds for the operations that suspend.
#[derive(Debug, Deserialize, Clone)]
pub struct TimeoutConfig {
    #[serde(default = "default_shell_timeout")]
    pub shell: u64,
    #[serde(default = "default_git_timeout")]
    pub git: u64,
    #[serde(default = "default_fetch_timeout")]
    pub fetch: u64,
    #[serde(default = "default_http_timeout")]
    pub http: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            shell: default_shell_timeout(),
            git: default_git_timeout(),
            fetch: default_fetch_timeout(),
            http: default_http_timeout(),
        }
    }
}

impl TimeoutConfig {
    pub fn shell(&self) -> Duration {
        Duration::from_secs(self.shell)
    }

    pub fn git(&self) -> Duration {
        Duration::from_secs(self.git)
    }

    pub fn fetch(&self) -> Duration {
        Duration::from_secs(self.fetch)
    }

    pub fn http(&self) -> Duration {
        Duration::from_secs(self.http)
    }
}

fn default_shell_timeout() -> u64 {
    30
}
fn default_git_timeout() -> u64 {
    10
}
fn default_fetch_timeout() -> u64 {
    15
}
fn default_http_timeout() -> u64 {
    30
}

/// Explicit executable locations. When unset, platform discovery is used.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct ExecutablesConfig {
    #[serde(default)]
    pub shell: Option<PathBuf>,
    #[serde(default)]
    pub git: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    /// Response bodies longer than this many characters are truncated.
    #[serde(default = "default_max_body_chars")]
    pub max_body_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_chars: default_max_body_chars(),
        }
    }
}

fn default_max_body_chars() -> usize {
    50_000
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_log_file")]
    pub file: String,
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file: default_log_file(),
            filter: default_log_filter(),
        }
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_log_file() -> String {
    "hermes.log".to_string()
}
fn default_log_filter() -> String {
    "info,reqwest=warn,hyper=warn,rmcp=warn".to_string()
}

impl AppConfig {
    /// Loads the configuration from `path`.
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        // An empty document deserializes to `null`, which serde_yaml rejects for a struct.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}
