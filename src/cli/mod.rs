// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;
use std::path::PathBuf;

use crate::config::{ConfigError, ServerConfig};

/// Civic Infrastructure Image Classification API server
#[derive(Parser, Debug, Default)]
#[command(name = "civic-vision-api")]
#[command(version)]
#[command(about = "Serves the civic-infrastructure image classifier over HTTP", long_about = None)]
pub struct Cli {
    /// TOML config file
    #[arg(long, env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Listen host (IP address or hostname)
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Listen port
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Path to the exported ONNX classifier
    #[arg(long, env = "MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "MODEL_THREADS")]
    pub intra_threads: Option<usize>,

    /// Apply softmax to the model output (true/false)
    #[arg(long, env = "APPLY_SOFTMAX")]
    pub apply_softmax: Option<bool>,

    /// Maximum images per batch request
    #[arg(long, env = "MAX_BATCH_SIZE")]
    pub max_batch_size: Option<usize>,

    /// Maximum request body size in bytes
    #[arg(long, env = "MAX_BODY_BYTES")]
    pub max_body_bytes: Option<usize>,
}

impl Cli {
    /// Resolve the final configuration: file (or defaults), then flags/env
    pub fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };

        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(model_path) = self.model_path {
            config.model_path = model_path;
        }
        if let Some(threads) = self.intra_threads {
            config.intra_threads = threads;
        }
        if let Some(apply_softmax) = self.apply_softmax {
            config.apply_softmax = apply_softmax;
        }
        if let Some(max_batch_size) = self.max_batch_size {
            config.max_batch_size = max_batch_size;
        }
        if let Some(max_body_bytes) = self.max_body_bytes {
            config.max_body_bytes = max_body_bytes;
        }

        config.validate()?;
        Ok(config)
    }
}
