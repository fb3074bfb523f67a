//! Folio runtime configuration management.
//!
//! Provides:
//! - Typed config schema (gateway, storage, counter, popup, logging)
//! - YAML loading with first-run defaults
//! - `FOLIO_*` environment overrides
//! - Default value application
//! - Schema validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

// Re-export most-used types at crate root.
pub use defaults::apply_all_defaults;
pub use env::{apply_env_overrides, apply_env_overrides_with, InvalidEnvVarError};
pub use io::{config_dir, config_file_path, load_config};
pub use schema::{
    CounterConfig, FolioConfig, GatewayConfig, IncrementStrategy, LoggingConfig, PopupConfig,
    StorageBackend, StorageConfig,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use std::path::Path;

/// Load, apply env overrides, apply defaults, and validate a config file.
///
/// This is the main entry point for loading a config at runtime. Validation
/// warnings are logged; any validation error fails the load.
pub async fn load_and_prepare(path: &Path) -> Result<FolioConfig> {
    let config = load_config(path).await?;
    let config = apply_env_overrides(config).context("Failed to apply env overrides")?;
    prepare(config)
}

/// Apply defaults and validate an already-loaded config.
pub fn prepare(config: FolioConfig) -> Result<FolioConfig> {
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if !report.is_valid() {
        bail!("config has {} validation error(s)", report.errors.len());
    }

    Ok(config)
}
