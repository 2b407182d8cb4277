// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fitplan API Server
//!
//! Mirrors Clerk users and generates workout/diet plans on request from the
//! voice assistant.

use fitplan_api::{
    config::{Config, StorageBackend},
    db::{Database, FirestoreDb, MemoryDb},
    services::{GroqClient, WebhookVerifier},
    AppState,
};
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(port = config.port, "Starting Fitplan API");

    let db: Arc<dyn Database> = match config.storage_backend {
        StorageBackend::Firestore => Arc::new(
            FirestoreDb::new(&config.gcp_project_id)
                .await
                .context("Failed to connect to Firestore")?,
        ),
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Arc::new(MemoryDb::new())
        }
    };

    let completion =
        GroqClient::new(&config).context("Failed to initialize completion client")?;
    tracing::info!(model = %completion.model(), "Completion client initialized");

    let webhook_verifier = WebhookVerifier::new(&config.clerk_webhook_secret)
        .context("CLERK_WEBHOOK_SECRET is not a valid signing secret")?;

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        completion: Arc::new(completion),
        webhook_verifier,
    });

    // Build router
    let app = fitplan_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fitplan_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
