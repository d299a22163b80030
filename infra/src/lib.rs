//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for TokenGate. It provides
//! the concrete pieces the core domain only describes through traits.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Storage**: sharded filesystem `TokenStore` behind an async filesystem seam
//! - **Audit**: per-shard, day-bucketed audit log
//! - **Telemetry**: `tracing` subscriber set-up
//! - **Config**: layered configuration loading

use std::sync::Arc;

// Re-export core types for convenience
pub use tg_core::errors::*;

use tg_core::services::permission::SubtypeRegistry;
use tg_core::services::token::{TokenService, TokenServiceConfig};
use tg_shared::AppConfig;

/// Audit module - file-backed audit sink
pub mod audit;

/// Configuration loading
pub mod config;

/// Storage module - filesystem token store
pub mod storage;

/// Tracing subscriber set-up
pub mod telemetry;

use storage::FsTokenStore;

/// Token service over the local filesystem store
pub type FsTokenService = TokenService<Arc<FsTokenStore>>;

/// Infrastructure service container
#[derive(Clone)]
pub struct InfrastructureServices {
    pub store: Arc<FsTokenStore>,
    pub token_service: Arc<FsTokenService>,
}

/// Wires the filesystem store and the token service from configuration
///
/// Creates the storage root if it does not exist yet.
pub async fn initialize(
    config: &AppConfig,
    registry: Arc<SubtypeRegistry>,
) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!(
        event = "infrastructure_init",
        environment = %config.environment,
        root = %config.storage.root_dir.display(),
        "Initializing infrastructure services"
    );

    create_root(config).await?;

    let store = Arc::new(FsTokenStore::open(&config.storage)?);
    let token_service = TokenService::new(
        store.clone(),
        registry,
        TokenServiceConfig::from(&config.storage),
    )?;

    Ok(InfrastructureServices {
        store,
        token_service: Arc::new(token_service),
    })
}

async fn create_root(config: &AppConfig) -> Result<(), InfrastructureError> {
    use storage::Filesystem;

    storage::LocalFilesystem
        .create_dir_all(&config.storage.root_dir, config.storage.dir_mode)
        .await
        .map_err(|e| {
            InfrastructureError::Domain(DomainError::store_io(format!(
                "Failed to create {}: {}",
                config.storage.root_dir.display(),
                e
            )))
        })
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Invalid configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration source could not be read or parsed
    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] ::config::ConfigError),

    /// Domain failure while wiring services
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Tracing subscriber could not be installed
    #[error("Telemetry error: {0}")]
    Telemetry(String),
}
