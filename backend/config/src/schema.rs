//! Folio runtime configuration schema.
//!
//! Every section is optional so a partial (or missing) YAML file is valid;
//! `defaults::apply_all_defaults` fills in the rest.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolioConfig {
    /// HTTP gateway settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<GatewayConfig>,

    /// Document / key-value storage backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,

    /// Visitor counter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter: Option<CounterConfig>,

    /// Referral popup timings and targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popup: Option<PopupConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<StorageBackend>,

    /// SQLite database file (ignored by the memory backend)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

// ---------------------------------------------------------------------------
// Counter
// ---------------------------------------------------------------------------

/// How the visitor counter bumps its document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncrementStrategy {
    /// One atomic increment on the store; concurrent visits never collide.
    #[default]
    Atomic,
    /// Separate read then write. Concurrent visits can overwrite each other.
    ReadModifyWrite,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<IncrementStrategy>,
}

// ---------------------------------------------------------------------------
// Popup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_show_delay_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_hours: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_duration_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_steps: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_target: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_target: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_earning_target: Option<u32>,

    /// Key of the persisted last-dismissal timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Directory for rolling NDJSON log files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
gateway:
  port: 9000
counter:
  documentPath: stats/visits
  strategy: read_modify_write
popup:
  cooldownHours: 12
"#;
        let cfg: FolioConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.gateway.unwrap().port, Some(9000));
        let counter = cfg.counter.unwrap();
        assert_eq!(counter.document_path.as_deref(), Some("stats/visits"));
        assert_eq!(counter.strategy, Some(IncrementStrategy::ReadModifyWrite));
        assert_eq!(cfg.popup.unwrap().cooldown_hours, Some(12));
        assert!(cfg.storage.is_none());
    }

    #[test]
    fn test_empty_config_serializes_to_empty_map() {
        let yaml = serde_yaml::to_string(&FolioConfig::default()).unwrap();
        assert_eq!(yaml.trim(), "{}");
    }
}
