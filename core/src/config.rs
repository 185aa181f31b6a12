//! Client configuration, read from an optional TOML file.
//!
//! ```toml
//! base_url = "http://localhost:3000"
//! page_size = 6
//! search_debounce_ms = 500
//! session_dir = "/home/me/.local/share/taskflow"
//! ```
//!
//! `TASKFLOW_API_URL` overrides `base_url`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::list_view::ViewOptions;
use crate::session::FileStorage;

pub const API_URL_ENV: &str = "TASKFLOW_API_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    #[serde(default = "default_session_dir")]
    pub session_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
            session_dir: default_session_dir(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_page_size() -> u32 {
    6
}

fn default_search_debounce_ms() -> u64 {
    500
}

fn default_session_dir() -> PathBuf {
    dirs::data_dir().map_or_else(|| PathBuf::from(".taskflow"), |dir| dir.join("taskflow"))
}

impl Config {
    /// Reads `path` if given and present, otherwise starts from defaults;
    /// then applies the environment override.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.base_url = url;
            }
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            page_size: self.page_size,
            search_debounce: Duration::from_millis(self.search_debounce_ms),
        }
    }

    pub fn session_storage(&self) -> FileStorage {
        FileStorage::new(&self.session_dir)
    }
}
