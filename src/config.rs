use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReaderConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl ReaderConfig {
    /// Loads `config.toml` from the default data directory.
    pub fn load() -> Result<Self> {
        let dir = default_data_dir()?;
        Self::load_from(&dir.join(CONFIG_FILE))
    }

    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", path.display()));
            }
        };
        toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }
}

// -----------------------------------------------------------------------------
// ApiConfig
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_base_url() -> String {
    "https://hacker-news.firebaseio.com/v0/".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_user_agent() -> String {
    concat!("hn_feed_reader/", env!("CARGO_PKG_VERSION")).to_string()
}

// -----------------------------------------------------------------------------
// StorageConfig / LogConfig
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_to_file")]
    pub to_file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_to_file(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_to_file() -> bool {
    true
}

pub fn default_data_dir() -> Result<PathBuf> {
    let home_dir = dirs_next::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
    Ok(home_dir.join(".hn_feed_reader"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReaderConfig::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.api.base_url, "https://hacker-news.firebaseio.com/v0/");
        assert_eq!(config.api.request_timeout_secs, 60);
        assert_eq!(config.log.level, "info");
        assert!(config.log.to_file);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[api]\nrequest_timeout_secs = 5\n\n[storage]\ndata_dir = \"/tmp/hn\"\n").unwrap();

        let config = ReaderConfig::load_from(&path).unwrap();
        assert_eq!(config.api.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.api.base_url, default_base_url());
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/hn"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[api\nbase_url = 3").unwrap();
        assert!(ReaderConfig::load_from(&path).is_err());
    }
}
