//! Restmeta API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dev_seed;
mod dto;
mod error;
mod handlers;
mod resources;
mod state;

use std::sync::Arc;

use restmeta_application::RecordStore;
use restmeta_core::AppError;
use restmeta_infrastructure::{InMemoryRecordStore, PostgresRecordStore};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api_config::{ApiConfig, StoreBackend};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let registry = Arc::new(resources::build_registry()?);

    let store: Arc<dyn RecordStore> = match &config.store_backend {
        StoreBackend::Memory => {
            let store = InMemoryRecordStore::new();
            dev_seed::run(&store).await?;
            Arc::new(store)
        }
        StoreBackend::Postgres(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to connect to database: {error}"))
                })?;
            Arc::new(PostgresRecordStore::new(pool))
        }
    };

    registry.validate_choice_sources(store.as_ref()).await?;

    let app_state = AppState::new(registry, store, config.translation_mode);
    let router = api_router::build_router(app_state, &config.frontend_url)?;

    let address = format!("{}:{}", config.api_host, config.api_port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to bind '{address}': {error}"))
        })?;

    info!(%address, "api listening");
    axum::serve(listener, router)
        .await
        .map_err(|error| AppError::Internal(format!("server error: {error}")))?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
