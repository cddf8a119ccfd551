// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server configuration
//!
//! Defaults, optionally overlaid by a TOML file, then by command-line flags
//! and environment variables (see [`crate::cli::Cli`]).

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::api::http_server::DEFAULT_MAX_BODY_BYTES;
use crate::vision::{ClassifierModelConfig, MAX_BATCH_SIZE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub intra_threads: usize,
    pub apply_softmax: bool,
    pub max_batch_size: usize,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let model = ClassifierModelConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            model_path: model.model_path,
            intra_threads: model.intra_threads,
            apply_softmax: model.apply_softmax,
            max_batch_size: MAX_BATCH_SIZE,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be non-zero".to_string()));
        }
        if self.max_batch_size == 0 {
            return Err(ConfigError::Invalid(
                "max_batch_size must be at least 1".to_string(),
            ));
        }
        if self.intra_threads == 0 {
            return Err(ConfigError::Invalid(
                "intra_threads must be at least 1".to_string(),
            ));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".to_string()));
        }
        Ok(())
    }

    /// Resolve `host:port` to the listen address. Accepts IP literals and
    /// hostnames such as `localhost`; the first resolved address wins.
    pub async fn resolve_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let invalid = || ConfigError::Invalid(format!("invalid listen address {}:{}", self.host, self.port));
        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|_| invalid())?
            .next()
            .ok_or_else(invalid)
    }

    pub fn model_config(&self) -> ClassifierModelConfig {
        ClassifierModelConfig {
            model_path: self.model_path.clone(),
            intra_threads: self.intra_threads,
            apply_softmax: self.apply_softmax,
        }
    }
}
