//! Environment variable overrides for config values.
//!
//! Deployment-specific settings (ports, database file, log level) can be set
//! through `FOLIO_*` variables without editing the YAML file.

use std::collections::HashMap;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::schema::{
    CounterConfig, FolioConfig, GatewayConfig, LoggingConfig, StorageConfig,
};

pub const ENV_BIND: &str = "FOLIO_BIND";
pub const ENV_PORT: &str = "FOLIO_PORT";
pub const ENV_DB: &str = "FOLIO_DB";
pub const ENV_STORAGE: &str = "FOLIO_STORAGE";
pub const ENV_COUNTER_STRATEGY: &str = "FOLIO_COUNTER_STRATEGY";
pub const ENV_LOG_LEVEL: &str = "FOLIO_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "FOLIO_LOG_DIR";

/// Error returned when an override variable holds an unusable value.
#[derive(Debug, thiserror::Error)]
#[error("Invalid value {value:?} for env var \"{var_name}\": {reason}")]
pub struct InvalidEnvVarError {
    pub var_name: String,
    pub value: String,
    pub reason: String,
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: FolioConfig) -> Result<FolioConfig, InvalidEnvVarError> {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

/// Apply overrides from a provided map (useful for testing).
pub fn apply_env_overrides_with(
    mut config: FolioConfig,
    env: &HashMap<String, String>,
) -> Result<FolioConfig, InvalidEnvVarError> {
    if let Some(bind) = lookup(env, ENV_BIND) {
        config.gateway.get_or_insert_with(GatewayConfig::default).bind = Some(bind.to_string());
    }
    if let Some(port) = lookup(env, ENV_PORT) {
        config.gateway.get_or_insert_with(GatewayConfig::default).port =
            Some(parse(ENV_PORT, port)?);
    }
    if let Some(path) = lookup(env, ENV_DB) {
        config.storage.get_or_insert_with(StorageConfig::default).path = Some(path.to_string());
    }
    if let Some(backend) = lookup(env, ENV_STORAGE) {
        config.storage.get_or_insert_with(StorageConfig::default).backend =
            Some(parse_enum(ENV_STORAGE, backend)?);
    }
    if let Some(strategy) = lookup(env, ENV_COUNTER_STRATEGY) {
        config.counter.get_or_insert_with(CounterConfig::default).strategy =
            Some(parse_enum(ENV_COUNTER_STRATEGY, strategy)?);
    }
    if let Some(level) = lookup(env, ENV_LOG_LEVEL) {
        config.logging.get_or_insert_with(LoggingConfig::default).level = Some(level.to_string());
    }
    if let Some(dir) = lookup(env, ENV_LOG_DIR) {
        config.logging.get_or_insert_with(LoggingConfig::default).dir = Some(dir.to_string());
    }
    Ok(config)
}

fn lookup<'a>(env: &'a HashMap<String, String>, var_name: &str) -> Option<&'a str> {
    let value = env.get(var_name).map(|v| v.trim()).filter(|v| !v.is_empty())?;
    debug!(var = var_name, "Config override from environment");
    Some(value)
}

fn parse<T>(var_name: &str, value: &str) -> Result<T, InvalidEnvVarError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| InvalidEnvVarError {
        var_name: var_name.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a snake_case enum the same way the YAML loader does.
fn parse_enum<T: DeserializeOwned>(var_name: &str, value: &str) -> Result<T, InvalidEnvVarError> {
    serde_json::from_value(serde_json::Value::String(value.to_string())).map_err(|e| {
        InvalidEnvVarError {
            var_name: var_name.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        }
    })
}
