// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use bank_cards_server::{
    api::router,
    config::{AppConfig, DEFAULT_LOG_FILTER},
    logging::init_logging,
    state::AppState,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(DEFAULT_LOG_FILTER, config.log_format) {
        eprintln!("Failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }
    tracing::debug!(?config, "Loaded configuration");

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(err) => {
            tracing::error!(error = %err, "Failed to open storage");
            return ExitCode::FAILURE;
        }
    };

    if let Some(seed) = &config.seed_admin {
        match state.accounts.ensure_admin(seed) {
            Ok(true) => tracing::info!(username = %seed.username, "Seeded admin account"),
            Ok(false) => tracing::debug!(username = %seed.username, "Admin account already present"),
            Err(err) => {
                tracing::error!(error = %err, "Failed to seed admin account");
                return ExitCode::FAILURE;
            }
        }
    }

    let addr = match config.bind_addr() {
        Ok(addr) => addr,
        Err(err) => {
            tracing::error!(error = %err, "Invalid bind address");
            return ExitCode::FAILURE;
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, %addr, "Failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(%addr, "Bank cards server listening (docs at /swagger-ui)");

    if let Err(err) = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "HTTP server failed");
        return ExitCode::FAILURE;
    }

    tracing::info!("Server stopped");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
