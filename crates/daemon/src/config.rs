// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration.
//!
//! Read from `config.toml` in the XDG config dir (or `--config` /
//! `FERRY_CONFIG`). Every section and field is optional:
//!
//! ```toml
//! [remote]
//! base_url = "https://api.example.com/api/"
//! token = "..."
//!
//! [sync]
//! strategy = "combined"
//! interval_secs = 900
//!
//! [probe]
//! host = "api.example.com"
//! port = 443
//!
//! [storage]
//! state_dir = "/var/lib/ferry"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use ferry_sync::{SchedulerConfig, SyncStrategy};

use crate::env;
use crate::error::{Error, Result};

const CONFIG_DIR_NAME: &str = "ferry";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Remote API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL every endpoint path is joined onto. Must end with `/`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token. `FERRY_API_TOKEN` takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/api/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// Background sync settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub strategy: SyncStrategy,
    /// Interval between background refreshes (default: 15 minutes).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Periodic intervals below this are clamped (default: 15 minutes).
    #[serde(default = "default_interval_secs")]
    pub min_interval_secs: u64,
    #[serde(default = "default_initial_backoff_secs")]
    pub initial_backoff_secs: u64,
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
    /// Refresh runs per execution, first attempt included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Cached rows not synced for this many days are pruned.
    #[serde(default = "default_prune_after_days")]
    pub prune_after_days: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            strategy: SyncStrategy::default(),
            interval_secs: default_interval_secs(),
            min_interval_secs: default_interval_secs(),
            initial_backoff_secs: default_initial_backoff_secs(),
            max_backoff_secs: default_max_backoff_secs(),
            max_attempts: default_max_attempts(),
            prune_after_days: default_prune_after_days(),
        }
    }
}

fn default_interval_secs() -> u64 {
    15 * 60
}

fn default_initial_backoff_secs() -> u64 {
    30
}

fn default_max_backoff_secs() -> u64 {
    10 * 60
}

fn default_max_attempts() -> u32 {
    3
}

fn default_prune_after_days() -> u32 {
    30
}

/// Connectivity probe settings. Host and port default to the remote's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,
    /// How often the daemon re-checks connectivity.
    #[serde(default = "default_probe_interval_secs")]
    pub interval_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            host: None,
            port: None,
            timeout_ms: default_probe_timeout_ms(),
            interval_secs: default_probe_interval_secs(),
        }
    }
}

fn default_probe_timeout_ms() -> u64 {
    3_000
}

fn default_probe_interval_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
}

impl Config {
    /// Default config location: `FERRY_CONFIG`, else `<config dir>/ferry/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        env::config_path()
            .or_else(|| dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)))
    }

    /// Load and validate the config at `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Parse and validate TOML content.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.base_url()?;
        if !self.remote.base_url.ends_with('/') {
            return Err(Error::Config(format!(
                "remote.base_url must end with '/': {url}"
            )));
        }
        if self.remote.timeout_secs == 0 {
            return Err(Error::Config("remote.timeout_secs must be positive".into()));
        }
        if self.sync.interval_secs == 0 {
            return Err(Error::Config("sync.interval_secs must be positive".into()));
        }
        if self.sync.max_attempts == 0 {
            return Err(Error::Config("sync.max_attempts must be at least 1".into()));
        }
        if self.sync.initial_backoff_secs > self.sync.max_backoff_secs {
            return Err(Error::Config(
                "sync.initial_backoff_secs exceeds sync.max_backoff_secs".into(),
            ));
        }
        if self.probe.timeout_ms == 0 {
            return Err(Error::Config("probe.timeout_ms must be positive".into()));
        }
        self.probe_target()?;
        Ok(())
    }

    /// Parsed remote base URL (http or https only).
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.remote.base_url).map_err(|e| {
            Error::Config(format!(
                "invalid remote.base_url '{}': {e}",
                self.remote.base_url
            ))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(Error::Config(format!(
                "unsupported remote.base_url scheme '{scheme}'\n  hint: use http:// or https://"
            ))),
        }
    }

    /// Token from the environment, else from the config file.
    pub fn api_token(&self) -> Option<String> {
        env::api_token().or_else(|| self.remote.token.clone())
    }

    /// `(host, port)` the connectivity probe dials.
    pub fn probe_target(&self) -> Result<(String, u16)> {
        let url = self.base_url()?;
        let host = match &self.probe.host {
            Some(host) => host.clone(),
            None => url
                .host_str()
                .ok_or_else(|| Error::Config("remote.base_url has no host".into()))?
                .to_string(),
        };
        let port = self
            .probe
            .port
            .or_else(|| url.port_or_known_default())
            .ok_or_else(|| Error::Config("cannot determine probe port".into()))?;
        Ok((host, port))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe.timeout_ms)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe.interval_secs.max(1))
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync.interval_secs)
    }

    pub fn prune_after(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.sync.prune_after_days))
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            min_periodic_interval: Duration::from_secs(self.sync.min_interval_secs),
            initial_backoff: Duration::from_secs(self.sync.initial_backoff_secs),
            max_backoff: Duration::from_secs(self.sync.max_backoff_secs),
            max_attempts: self.sync.max_attempts,
        }
    }

    /// State directory: `--state-dir`, `[storage] state_dir`, `FERRY_STATE_DIR`,
    /// then the XDG state dir.
    pub fn state_dir(&self, cli: Option<&Path>) -> PathBuf {
        if let Some(dir) = cli {
            return dir.to_path_buf();
        }
        if let Some(dir) = &self.storage.state_dir {
            return dir.clone();
        }
        if let Some(dir) = env::state_dir() {
            return dir;
        }
        if let Some(dir) = env::xdg_state_home() {
            return dir.join(CONFIG_DIR_NAME);
        }
        dirs::home_dir()
            .map(|h| h.join(".local/state/ferry"))
            .unwrap_or_else(|| PathBuf::from(".local/state/ferry"))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
