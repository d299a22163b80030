//! Configuration loading
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults combined with the `TOKEN_*` environment variables
//! 2. `tokengate.<environment>.toml` in the working directory, if present
//! 3. An explicit configuration file
//! 4. `TOKENGATE__SECTION__KEY` environment variables

use std::path::Path;

use config::{Config, Environment as EnvSource, File};
use tg_shared::AppConfig;

use crate::InfrastructureError;

/// Prefix of the layered environment overrides
pub const ENV_PREFIX: &str = "TOKENGATE";

/// Loads `.env`, then the layered configuration
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, InfrastructureError> {
    dotenvy::dotenv().ok();
    load_config_with_prefix(path, ENV_PREFIX)
}

/// Same as [`load_config`] with a custom environment prefix and without `.env`
pub fn load_config_with_prefix(
    path: Option<&Path>,
    env_prefix: &str,
) -> Result<AppConfig, InfrastructureError> {
    let base = AppConfig::from_env();

    let mut builder = Config::builder()
        .add_source(Config::try_from(&base)?)
        .add_source(File::with_name(&base.environment.config_file()).required(false));

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(
        EnvSource::with_prefix(env_prefix)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config: AppConfig = builder.build()?.try_deserialize()?;
    config.storage.validate().map_err(InfrastructureError::Config)?;

    tracing::debug!(
        event = "config_loaded",
        environment = %config.environment,
        root = %config.storage.root_dir.display()
    );
    Ok(config)
}
