//! Host configuration.
//!
//! Read from `lattice_lab.ron` in the working directory (or the file named by
//! `LATTICE_LAB_CONFIG`); every field is optional. `LATTICE_API_URL`
//! overrides the backend address.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use lattice_engine::{ApiSettings, DEFAULT_API_URL};
use lattice_logging::{LogDestination, DEFAULT_LOG_FILE};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILENAME: &str = "lattice_lab.ron";
pub const CONFIG_PATH_ENV: &str = "LATTICE_LAB_CONFIG";
pub const API_URL_ENV: &str = "LATTICE_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    pub download_dir: PathBuf,
    pub log_to_file: bool,
    pub connect_timeout_secs: u64,
    /// Unset means no limit beyond the connect timeout.
    pub request_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            download_dir: PathBuf::from("downloads"),
            log_to_file: false,
            connect_timeout_secs: 10,
            request_timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// Loads the config the way the binary does, consulting the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
        let api_url = std::env::var(API_URL_ENV).ok();
        Self::load(&path, api_url)
    }

    /// A missing file yields the defaults; an unreadable or invalid one is an error.
    pub fn load(path: &Path, api_url_override: Option<String>) -> anyhow::Result<Self> {
        let mut config = match fs::read_to_string(path) {
            Ok(text) => ron::from_str::<AppConfig>(&text)
                .with_context(|| format!("invalid config file {}", path.display()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
            Err(err) => {
                return Err(err).with_context(|| format!("cannot read {}", path.display()));
            }
        };
        if let Some(url) = api_url_override.filter(|url| !url.trim().is_empty()) {
            config.api_url = url;
        }
        Ok(config)
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.api_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            ..ApiSettings::default()
        }
    }

    pub fn log_destination(&self) -> LogDestination {
        if self.log_to_file {
            LogDestination::File(PathBuf::from(DEFAULT_LOG_FILE))
        } else {
            LogDestination::Terminal
        }
    }
}
