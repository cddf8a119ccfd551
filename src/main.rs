// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use civic_vision_api::{
    api::{start_server, AppState},
    cli::Cli,
    config::ServerConfig,
    version,
    vision::{load_classifier, ModelManager},
};
use clap::Parser;
use std::env;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    info!("Starting {}", version::get_version_string());

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config: ServerConfig = cli.into_config()?;
    let addr = config.resolve_socket_addr().await?;

    // The server never starts without a model
    let model_config = config.model_config();
    let classifier = tokio::task::spawn_blocking(move || load_classifier(&model_config))
        .await
        .context("Model loading task failed")?
        .context("Failed to load classifier model")?;

    let model_manager = ModelManager::new();
    model_manager.install(classifier)?;
    info!("Model loaded successfully");

    let state = AppState::new(model_manager, config.max_batch_size, config.max_body_bytes);
    start_server(addr, state, shutdown_signal()).await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
