use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracker_client::{write_atomically, ApiSettings, PersistError, PollSettings, DEFAULT_SERVER_URL};
use tracker_core::DEFAULT_GROUP;
use tracker_logging::{tracker_info, tracker_warn};

pub const DEFAULT_CONFIG_PATH: &str = "novel_tracker.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_url: String,
    pub poll_interval_ms: u64,
    pub max_poll_failures: u32,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Group used by `add` when `--group` is not given.
    pub default_group: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            poll_interval_ms: 1000,
            max_poll_failures: 3,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            default_group: DEFAULT_GROUP.to_string(),
        }
    }
}

impl AppConfig {
    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.server_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs.max(1)),
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
        }
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(self.poll_interval_ms.max(50)),
            max_failures: self.max_poll_failures.max(1),
        }
    }

    /// Longest quiet period to wait for the next client event before giving up.
    pub fn event_wait(&self) -> Duration {
        let poll = self.poll_settings().interval * 2;
        let request = self.api_settings().request_timeout + Duration::from_secs(5);
        poll.max(request)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
    #[error("failed to write config: {0}")]
    Persist(#[from] PersistError),
}

/// Reads the config file, falling back to defaults when it is missing or unreadable.
pub fn load_config(path: &Path) -> AppConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return AppConfig::default();
        }
        Err(err) => {
            tracker_warn!("Failed to read config from {:?}: {}", path, err);
            return AppConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            tracker_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            tracker_warn!("Failed to parse config from {:?}: {}", path, err);
            AppConfig::default()
        }
    }
}

pub fn render_config(config: &AppConfig) -> Result<String, ConfigError> {
    let pretty = ron::ser::PrettyConfig::new();
    Ok(ron::ser::to_string_pretty(config, pretty)?)
}

pub fn save_config(path: &Path, config: &AppConfig, overwrite: bool) -> Result<(), ConfigError> {
    if path.exists() && !overwrite {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    let content = render_config(config)?;
    write_atomically(path, &content)?;
    tracker_info!("Wrote config to {:?}", path);
    Ok(())
}
