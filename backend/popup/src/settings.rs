use std::time::Duration;

use folio_config::defaults::{
    DEFAULT_ANIMATION_DURATION_MS, DEFAULT_ANIMATION_STEPS, DEFAULT_AUTO_SHOW_DELAY_MS,
    DEFAULT_COOLDOWN_HOURS, DEFAULT_DISCOUNT_TARGET, DEFAULT_MAX_EARNING_TARGET,
    DEFAULT_POPUP_STORAGE_KEY, DEFAULT_REWARD_TARGET,
};
use folio_config::PopupConfig;

use crate::state::AnimatedValues;

/// Resolved popup timings, targets and storage key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupSettings {
    pub auto_show_delay: Duration,
    pub cooldown: Duration,
    pub animation_duration: Duration,
    pub animation_steps: u32,
    pub targets: AnimatedValues,
    pub storage_key: String,
}

impl PopupSettings {
    /// Build settings from the `popup:` config section; unset fields take
    /// the built-in defaults.
    pub fn from_config(config: &PopupConfig) -> Self {
        Self {
            auto_show_delay: Duration::from_millis(
                config.auto_show_delay_ms.unwrap_or(DEFAULT_AUTO_SHOW_DELAY_MS),
            ),
            cooldown: Duration::from_secs(
                config
                    .cooldown_hours
                    .unwrap_or(DEFAULT_COOLDOWN_HOURS)
                    .saturating_mul(60 * 60),
            ),
            animation_duration: Duration::from_millis(
                config
                    .animation_duration_ms
                    .unwrap_or(DEFAULT_ANIMATION_DURATION_MS),
            ),
            animation_steps: config
                .animation_steps
                .unwrap_or(DEFAULT_ANIMATION_STEPS)
                .max(1),
            targets: AnimatedValues {
                reward: config.reward_target.unwrap_or(DEFAULT_REWARD_TARGET),
                discount_percent: config.discount_target.unwrap_or(DEFAULT_DISCOUNT_TARGET),
                max_earning: config
                    .max_earning_target
                    .unwrap_or(DEFAULT_MAX_EARNING_TARGET),
            },
            storage_key: config
                .storage_key
                .clone()
                .unwrap_or_else(|| DEFAULT_POPUP_STORAGE_KEY.to_string()),
        }
    }
}

impl Default for PopupSettings {
    fn default() -> Self {
        Self::from_config(&PopupConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = PopupSettings::default();
        assert_eq!(settings.auto_show_delay, Duration::from_secs(3));
        assert_eq!(settings.cooldown, Duration::from_secs(86_400));
        assert_eq!(settings.animation_duration, Duration::from_millis(2_000));
        assert_eq!(settings.animation_steps, 60);
        assert_eq!(settings.targets.max_earning, 5_000);
        assert_eq!(settings.storage_key, "referral_popup_last_seen");
    }

    #[test]
    fn overrides_from_config() {
        let settings = PopupSettings::from_config(&PopupConfig {
            cooldown_hours: Some(1),
            animation_steps: Some(10),
            storage_key: Some("promo".into()),
            ..Default::default()
        });
        assert_eq!(settings.cooldown, Duration::from_secs(3_600));
        assert_eq!(settings.animation_steps, 10);
        assert_eq!(settings.storage_key, "promo");
        assert_eq!(settings.targets.reward, 500);
    }

    #[test]
    fn huge_cooldown_saturates() {
        let settings = PopupSettings::from_config(&PopupConfig {
            cooldown_hours: Some(u64::MAX),
            ..Default::default()
        });
        assert_eq!(settings.cooldown, Duration::from_secs(u64::MAX));
    }
}
