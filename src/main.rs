// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::application::query_service::QueryService;
use crate::application::reading_store::ReadingStore;
use crate::application::scheduler::Scheduler;
use crate::application::simulation_engine::SimulationEngine;
use crate::domain::sampler::{RandomSampler, Sampler};
use crate::infrastructure::config::{load_app_config, AppConfig, StorageBackend};
use crate::infrastructure::file_store::FileReadingStore;
use crate::infrastructure::memory_store::InMemoryReadingStore;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = load_app_config().context("Failed to load configuration")?;

    // Initialize tracing; RUST_LOG takes precedence over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Create store (infrastructure layer)
    let store = open_store(&config).await?;

    // Create engine and scheduler (application layer)
    let sampler: Box<dyn Sampler> = match config.simulation.seed {
        Some(seed) => Box::new(RandomSampler::seeded(seed)),
        None => Box::new(RandomSampler::from_entropy()),
    };
    let engine = Arc::new(SimulationEngine::new(
        config.simulation.profile(),
        sampler,
        store.clone(),
    ));
    let scheduler = Arc::new(Scheduler::new(engine, config.simulation.tick_interval()));
    if config.simulation.autostart {
        scheduler.start().await?;
    }

    // Create application state
    let state = Arc::new(AppState {
        query_service: QueryService::new(store, config.query.realtime_window),
        scheduler: scheduler.clone(),
    });

    // Build router (presentation layer)
    let router = build_router(state, &config.server.allowed_origins);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Starting lawnmower-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if scheduler.is_running().await {
        scheduler.stop().await?;
    }

    Ok(())
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ReadingStore>> {
    let store: Arc<dyn ReadingStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(InMemoryReadingStore::new()),
        StorageBackend::File => Arc::new(
            FileReadingStore::open(&config.storage.path)
                .await
                .with_context(|| format!("Failed to open reading store {}", config.storage.path))?,
        ),
    };
    Ok(store)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
