use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default bind address of the chat backend.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub api_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("charla").join("config.json"))
    }
}

/// Resolve the chat backend base URL: environment variable first, then the
/// config file, then the default local backend.
pub fn resolve_api_url() -> String {
    let env_url = std::env::var("CHARLA_API_URL").ok();
    let config = Config::load().unwrap_or_else(|_| Config::new());
    resolve_from(env_url, &config)
}

fn resolve_from(env_url: Option<String>, config: &Config) -> String {
    env_url
        .filter(|url| !url.is_empty())
        .or_else(|| config.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_wins_over_config() {
        let config = Config {
            api_url: Some("http://config:9000".to_string()),
        };
        let url = resolve_from(Some("http://env:7000".to_string()), &config);
        assert_eq!(url, "http://env:7000");
    }

    #[test]
    fn test_empty_env_var_is_ignored() {
        let config = Config {
            api_url: Some("http://config:9000".to_string()),
        };
        let url = resolve_from(Some(String::new()), &config);
        assert_eq!(url, "http://config:9000");
    }

    #[test]
    fn test_falls_back_to_default() {
        let url = resolve_from(None, &Config::new());
        assert_eq!(url, DEFAULT_API_URL);
    }

    #[test]
    fn test_load_from_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert!(config.api_url.is_none());
    }

    #[test]
    fn test_load_from_reads_api_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "api_url": "http://example:8000" }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://example:8000"));
    }

    #[test]
    fn test_load_from_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
