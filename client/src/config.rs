//! Client configuration with TOML file support.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding [`ClientConfig::base_url`].
pub const API_URL_ENV: &str = "IDV_API_URL";

/// Configuration for the verification client.
///
/// Can be loaded from a TOML file via [`ClientConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). The request timeout is fixed and
/// deliberately not part of this struct.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base address of the remote service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// File holding the persisted bearer credential.
    #[serde(default = "default_credential_file")]
    pub credential_file: PathBuf,

    /// Login entry point handed to the session-reset handler.
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_base_url() -> String {
    "http://localhost:9091".to_string()
}

fn default_credential_file() -> PathBuf {
    PathBuf::from("./idv_session.json")
}

fn default_login_path() -> String {
    idv_session::LOGIN_ENTRY_POINT.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            credential_file: default_credential_file(),
            login_path: default_login_path(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid base URL '{value}': {detail}")]
    InvalidBaseUrl { value: String, detail: String },
}

impl ClientConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Apply overrides from a variable lookup, usually `std::env::var`.
    ///
    /// The result is not validated; callers layering further overrides
    /// call [`ClientConfig::validate`] once they are done.
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        self
    }

    /// Check that the base URL is an absolute http(s) address.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |detail: String| ConfigError::InvalidBaseUrl {
            value: self.base_url.clone(),
            detail,
        };
        let url = reqwest::Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(invalid(format!("unsupported scheme '{other}'"))),
        }
    }
}
