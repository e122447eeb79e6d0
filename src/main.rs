use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod domain;
mod error;
mod metrics;
mod store;

use config::{AppConfig, StorageBackend};
use store::{MemoryStore, PostgresStore, Store};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,pizzaria=debug")),
        )
        .init();

    tracing::info!("🍕 Starting pizzaria order service");

    // === 1. Configuration ===
    let config = AppConfig::load().context("loading configuration")?;
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        storage = ?config.storage,
        "Configuration loaded"
    );

    // === 2. Storage ===
    let store: Arc<dyn Store> = match config.storage {
        StorageBackend::Postgres => {
            let postgres = PostgresStore::connect(&config.database)
                .await
                .context("connecting to PostgreSQL")?;
            if config.database.run_migrations {
                postgres.migrate().await.context("running migrations")?;
            }
            Arc::new(postgres)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            let memory = MemoryStore::new();
            store::seed_catalog(&memory)
                .await
                .context("seeding in-memory catalog")?;
            Arc::new(memory)
        }
    };

    // === 3. Prometheus metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!(
        "📊 Metrics registry created with {} metrics",
        metrics.registry().gather().len()
    );

    // === 4. HTTP API ===
    let state = web::Data::new(api::AppState::new(store, metrics));
    let bind = config.bind_address();
    tracing::info!("🚀 Listening on http://{}:{}/api", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .service(web::scope("/api").configure(api::configure))
    })
    .bind(bind)?
    .run()
    .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}
