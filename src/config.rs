use std::{env, path::PathBuf};
use thiserror::Error;

const DEFAULT_API_PORT: u16 = 5000;
const DEFAULT_WEB_PORT: u16 = 3000;
const DEFAULT_DATA_PATH: &str = "data/parksense.json";
/// Camera frames can exceed axum's default 2 MiB body limit.
const DEFAULT_UPLOAD_LIMIT: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be a port number, got {value:?}")]
    InvalidPort { key: &'static str, value: String },

    #[error("{key} must be a size in bytes, got {value:?}")]
    InvalidSize { key: &'static str, value: String },
}

/// Deployment settings, read from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_port: u16,
    pub web_port: u16,
    pub data_path: PathBuf,
    /// Base URL the pages use to reach the API listener.
    pub api_base_url: String,
    pub recognizer_url: Option<String>,
    /// Largest `/upload` request body accepted, in bytes.
    pub upload_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_port = parse_port("PORT", var("PORT"), DEFAULT_API_PORT)?;
        let web_port = parse_port("WEB_PORT", var("WEB_PORT"), DEFAULT_WEB_PORT)?;
        let data_path = var("PARKSENSE_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        let api_base_url = var("PARKSENSE_API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://localhost:{api_port}"));

        let upload_limit = match var("PARKSENSE_UPLOAD_LIMIT") {
            None => DEFAULT_UPLOAD_LIMIT,
            Some(value) => value
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or(ConfigError::InvalidSize {
                    key: "PARKSENSE_UPLOAD_LIMIT",
                    value,
                })?,
        };

        Ok(Self {
            api_port,
            web_port,
            data_path,
            api_base_url,
            recognizer_url: var("PARKSENSE_RECOGNIZER_URL"),
            upload_limit,
        })
    }
}

fn parse_port(key: &'static str, value: Option<String>, default: u16) -> Result<u16, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidPort { key, value }),
    }
}
