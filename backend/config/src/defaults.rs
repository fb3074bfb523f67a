//! Config defaults: applies default values to parsed config.

use crate::schema::{
    CounterConfig, FolioConfig, GatewayConfig, IncrementStrategy, LoggingConfig, PopupConfig,
    StorageBackend, StorageConfig,
};

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DB_PATH: &str = "folio.db";
pub const DEFAULT_COUNTER_PATH: &str = "visitors/counter";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Delay between mount and the automatic popup show.
pub const DEFAULT_AUTO_SHOW_DELAY_MS: u64 = 3_000;
/// Automatic shows are suppressed this long after a dismissal.
pub const DEFAULT_COOLDOWN_HOURS: u64 = 24;
pub const DEFAULT_ANIMATION_DURATION_MS: u64 = 2_000;
pub const DEFAULT_ANIMATION_STEPS: u32 = 60;
pub const DEFAULT_REWARD_TARGET: u32 = 500;
pub const DEFAULT_DISCOUNT_TARGET: u32 = 25;
pub const DEFAULT_MAX_EARNING_TARGET: u32 = 5_000;
pub const DEFAULT_POPUP_STORAGE_KEY: &str = "referral_popup_last_seen";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: FolioConfig) -> FolioConfig {
    let config = apply_gateway_defaults(config);
    let config = apply_storage_defaults(config);
    let config = apply_counter_defaults(config);
    let config = apply_popup_defaults(config);
    apply_logging_defaults(config)
}

fn apply_gateway_defaults(mut config: FolioConfig) -> FolioConfig {
    let gateway = config.gateway.get_or_insert_with(GatewayConfig::default);
    gateway.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
    gateway.port.get_or_insert(DEFAULT_PORT);
    config
}

fn apply_storage_defaults(mut config: FolioConfig) -> FolioConfig {
    let storage = config.storage.get_or_insert_with(StorageConfig::default);
    storage.backend.get_or_insert(StorageBackend::default());
    storage.path.get_or_insert_with(|| DEFAULT_DB_PATH.to_string());
    config
}

fn apply_counter_defaults(mut config: FolioConfig) -> FolioConfig {
    let counter = config.counter.get_or_insert_with(CounterConfig::default);
    counter
        .document_path
        .get_or_insert_with(|| DEFAULT_COUNTER_PATH.to_string());
    counter.strategy.get_or_insert(IncrementStrategy::default());
    config
}

fn apply_popup_defaults(mut config: FolioConfig) -> FolioConfig {
    let popup = config.popup.get_or_insert_with(PopupConfig::default);
    popup.auto_show_delay_ms.get_or_insert(DEFAULT_AUTO_SHOW_DELAY_MS);
    popup.cooldown_hours.get_or_insert(DEFAULT_COOLDOWN_HOURS);
    popup
        .animation_duration_ms
        .get_or_insert(DEFAULT_ANIMATION_DURATION_MS);
    popup.animation_steps.get_or_insert(DEFAULT_ANIMATION_STEPS);
    popup.reward_target.get_or_insert(DEFAULT_REWARD_TARGET);
    popup.discount_target.get_or_insert(DEFAULT_DISCOUNT_TARGET);
    popup.max_earning_target.get_or_insert(DEFAULT_MAX_EARNING_TARGET);
    popup
        .storage_key
        .get_or_insert_with(|| DEFAULT_POPUP_STORAGE_KEY.to_string());
    config
}

fn apply_logging_defaults(mut config: FolioConfig) -> FolioConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.json.get_or_insert(false);
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_popup_constants() {
        let cfg = apply_all_defaults(FolioConfig::default());
        let popup = cfg.popup.unwrap();
        assert_eq!(popup.auto_show_delay_ms, Some(3_000));
        assert_eq!(popup.cooldown_hours, Some(24));
        assert_eq!(popup.animation_steps, Some(60));
        assert_eq!(popup.reward_target, Some(500));
        assert_eq!(popup.discount_target, Some(25));
        assert_eq!(popup.max_earning_target, Some(5_000));
    }

    #[test]
    fn applies_counter_defaults() {
        let cfg = apply_all_defaults(FolioConfig::default());
        let counter = cfg.counter.unwrap();
        assert_eq!(counter.document_path.as_deref(), Some(DEFAULT_COUNTER_PATH));
        assert_eq!(counter.strategy, Some(IncrementStrategy::Atomic));
    }

    #[test]
    fn does_not_override_user_values() {
        let mut cfg = FolioConfig::default();
        cfg.gateway = Some(GatewayConfig {
            port: Some(3000),
            ..Default::default()
        });
        let cfg = apply_all_defaults(cfg);
        let gateway = cfg.gateway.unwrap();
        assert_eq!(gateway.port, Some(3000));
        assert_eq!(gateway.bind.as_deref(), Some(DEFAULT_BIND));
    }
}
