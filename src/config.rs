//! Application configuration
//!
//! Built-in defaults, overridden by an optional `harmoura.toml` in the working
//! directory, then by `HARMOURA_*` environment variables.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "harmoura.toml";
const SESSION_FILE: &str = "session.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub cache_dir: PathBuf,
    pub log_dir: PathBuf,
    pub search_debounce_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            cache_dir: PathBuf::from(".cache"),
            log_dir: PathBuf::from(".logs"),
            search_debounce_ms: 300,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::from_file(Path::new(CONFIG_FILE))?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Defaults when `path` does not exist; a file that exists must parse.
    fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Invalid config file {}", path.display()))
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base_url) = value("HARMOURA_BASE_URL") {
            self.base_url = base_url.trim().to_string();
        }
        if let Some(dir) = value("HARMOURA_CACHE_DIR") {
            self.cache_dir = PathBuf::from(dir);
        }
        if let Some(dir) = value("HARMOURA_LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("harmoura-config-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = Config::from_file(Path::new("/nonexistent/harmoura.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
        assert_eq!(config.session_path(), PathBuf::from(".cache/session.json"));
    }

    #[test]
    fn file_overrides_only_what_it_sets() {
        let path = temp_file("partial", "base_url = \"https://music.example.com\"\nsearch_debounce_ms = 500\n");
        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.base_url, "https://music.example.com");
        assert_eq!(config.search_debounce_ms, 500);
        assert_eq!(config.log_dir, PathBuf::from(".logs"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = temp_file("broken", "base_url = [");
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn environment_wins_over_file() {
        let path = temp_file("env", "base_url = \"https://music.example.com\"\n");
        let mut config = Config::from_file(&path).unwrap();
        let env: HashMap<&str, &str> = [
            ("HARMOURA_BASE_URL", "http://10.0.0.2:8000"),
            ("HARMOURA_CACHE_DIR", "/tmp/harmoura"),
            ("HARMOURA_LOG_DIR", ""),
        ]
        .into_iter()
        .collect();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.base_url, "http://10.0.0.2:8000");
        assert_eq!(config.session_path(), PathBuf::from("/tmp/harmoura/session.json"));
        assert_eq!(config.log_dir, PathBuf::from(".logs"));
    }

    #[test]
    fn timeout_is_never_zero() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }
}
