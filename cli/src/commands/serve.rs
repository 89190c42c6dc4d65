// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `ci-api serve`
//!
//! Loads and validates the configuration, seeds the in-memory stores and
//! serves the `/v3` router until Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use axum::Router;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use ci_api_core::domain::api_config::ApiConfig;
use ci_api_core::domain::policy::AuthPolicy;
use ci_api_core::infrastructure::seed::SeedData;
use ci_api_core::infrastructure::{AesGcmCipher, HttpInsightsClient, InMemoryStores};
use ci_api_core::presentation::api::{app, AppState};

#[derive(Args)]
pub struct ServeArgs {
    /// YAML file with users, tokens, permissions and repositories to load
    #[arg(long, env = "CI_API_SEED_PATH", value_name = "FILE")]
    pub seed: Option<PathBuf>,

    /// HTTP listener host (overrides http.host)
    #[arg(long, env = "CI_API_HOST")]
    pub host: Option<String>,

    /// HTTP listener port (overrides http.port)
    #[arg(long, env = "CI_API_PORT")]
    pub port: Option<u16>,
}

pub async fn run(args: ServeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = ApiConfig::load_or_default(config_path).context("Failed to load configuration")?;
    if let Some(host) = args.host {
        config.http.host = host;
    }
    if let Some(port) = args.port {
        config.http.port = port;
    }
    config.validate().context("Configuration validation failed")?;

    info!(site = %config.site, "Configuration loaded");

    let router = build_app(&config, args.seed.as_deref()).await?;

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("CI API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("CI API shutting down");

    Ok(())
}

/// Wire stores, cipher and insights client into the router
pub async fn build_app(config: &ApiConfig, seed: Option<&Path>) -> Result<Router> {
    let cipher = Arc::new(
        AesGcmCipher::from_base64_key(&config.encryption.key).context("Invalid encryption key")?,
    );
    let insights_client = Arc::new(
        HttpInsightsClient::from_config(&config.insights)
            .context("Failed to initialize insights client")?,
    );

    let stores = InMemoryStores::new();
    if let Some(path) = seed {
        SeedData::from_yaml_file(path)?
            .apply(&stores, cipher.as_ref())
            .await
            .with_context(|| format!("Failed to apply seed data from {:?}", path))?;
    }

    let state = AppState::with_stores(AuthPolicy::new(config.site), &stores, cipher, insights_client);
    Ok(app(state))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
