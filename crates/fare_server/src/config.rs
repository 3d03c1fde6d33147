//! Server configuration
//!
//! Values are layered, later sources winning: built-in defaults, an optional
//! TOML file, `FARECAST_*` environment variables and finally command-line
//! flags (applied by the binary).

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_HOST: &str = "FARECAST_HOST";
pub const ENV_PORT: &str = "FARECAST_PORT";
pub const ENV_MODEL_PATH: &str = "FARECAST_MODEL_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            model_path: PathBuf::from("models/model_forest.bin.gz"),
        }
    }
}

impl ServerConfig {
    /// Defaults, then `path` if given, then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            let host = host.trim();
            if host.is_empty() {
                return Err(ConfigError::InvalidEnv {
                    key: ENV_HOST,
                    value: host.to_string(),
                    reason: "host must not be empty".to_string(),
                });
            }
            self.host = host.to_string();
        }

        if let Some(port) = lookup(ENV_PORT) {
            self.port = port
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigError::InvalidEnv {
                    key: ENV_PORT,
                    value: port.clone(),
                    reason: e.to_string(),
                })?;
        }

        if let Some(model_path) = lookup(ENV_MODEL_PATH) {
            if model_path.trim().is_empty() {
                return Err(ConfigError::InvalidEnv {
                    key: ENV_MODEL_PATH,
                    value: model_path,
                    reason: "model path must not be empty".to_string(),
                });
            }
            self.model_path = PathBuf::from(model_path);
        }

        Ok(())
    }

    /// `host:port` for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
