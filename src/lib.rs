//! IP Key Service
//!
//! Issues and manages short-lived, per-client access keys keyed by client
//! network address:
//! - get-or-create issuance with a fixed 24h time-to-live
//! - administrative override and revocation
//! - a background reaper that purges expired records

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use api::state::AppState;
use domain::key::ExpiryPolicy;
use infrastructure::key::{
    AccessService, InMemoryKeyRecordRepository, KeyGenerator, PostgresKeyRecordRepository, Reaper,
    ReaperHandle,
};

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<(AppState, ReaperHandle)> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state and start the reaper
///
/// Returns the state for the HTTP layer together with the handle owning
/// the background sweep task; the caller stops the reaper on shutdown.
pub async fn create_app_state_with_config(
    config: &AppConfig,
) -> anyhow::Result<(AppState, ReaperHandle)> {
    let generator = KeyGenerator::new(config.keys.token_length);
    let policy = ExpiryPolicy::from_secs(config.keys.ttl_secs);
    let sweep_interval = Duration::from_secs(config.keys.sweep_interval_secs);

    match config.storage.backend.as_str() {
        "postgres" => {
            let database_url = std::env::var("DATABASE_URL").map_err(|_| {
                anyhow::anyhow!(
                    "DATABASE_URL environment variable is required for the postgres backend"
                )
            })?;

            info!("Connecting to PostgreSQL...");
            let repository = PostgresKeyRecordRepository::connect(&database_url).await?;
            repository.ensure_table().await?;
            info!("PostgreSQL connection established");

            let service = Arc::new(
                AccessService::new(Arc::new(repository))
                    .with_generator(generator)
                    .with_policy(policy)
                    .with_display_prefix(config.keys.display_prefix.clone()),
            );
            let reaper = Reaper::spawn(service.clone(), sweep_interval);

            Ok((AppState::new(service), reaper))
        }
        backend => {
            if backend != "memory" {
                warn!("Unknown storage backend '{}', using in-memory", backend);
            }

            info!("Using in-memory key record store");

            let service = Arc::new(
                AccessService::new(Arc::new(InMemoryKeyRecordRepository::new()))
                    .with_generator(generator)
                    .with_policy(policy)
                    .with_display_prefix(config.keys.display_prefix.clone()),
            );
            let reaper = Reaper::spawn(service.clone(), sweep_interval);

            Ok((AppState::new(service), reaper))
        }
    }
}
