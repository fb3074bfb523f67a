//! Config validation: schema checks with user-friendly error messages.

use thiserror::Error;

use crate::schema::{FolioConfig, StorageBackend};

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// Errors and warnings found in one validation pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &FolioConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_gateway(config, &mut report);
    validate_storage(config, &mut report);
    validate_counter(config, &mut report);
    validate_popup(config, &mut report);
    report
}

fn validate_gateway(config: &FolioConfig, report: &mut ValidationReport) {
    let Some(gw) = &config.gateway else { return };
    if let Some(port) = gw.port {
        if port == 0 {
            report.error("gateway.port", "port must be > 0");
        } else if port < 1024 && port != 80 && port != 443 {
            report.warn(
                "gateway.port",
                format!("Port {port} requires elevated privileges; consider using a port >= 1024"),
            );
        }
    }
}

fn validate_storage(config: &FolioConfig, report: &mut ValidationReport) {
    let Some(storage) = &config.storage else { return };
    match storage.backend {
        Some(StorageBackend::Sqlite) => {
            if storage.path.as_deref().map(str::trim).unwrap_or("").is_empty() {
                report.error("storage.path", "SQLite backend requires a database path");
            }
        }
        Some(StorageBackend::Memory) => {
            report.warn(
                "storage.backend",
                "Memory backend loses the visitor count and popup state on restart",
            );
        }
        None => {}
    }
}

fn validate_counter(config: &FolioConfig, report: &mut ValidationReport) {
    let Some(counter) = &config.counter else { return };
    if let Some(path) = &counter.document_path {
        if path.trim().is_empty() {
            report.error("counter.documentPath", "Document path cannot be empty");
        } else if path.starts_with('/') || path.ends_with('/') {
            report.error(
                "counter.documentPath",
                format!("Document path '{path}' must not start or end with '/'"),
            );
        }
    }
}

fn validate_popup(config: &FolioConfig, report: &mut ValidationReport) {
    let Some(popup) = &config.popup else { return };
    if popup.animation_steps == Some(0) {
        report.error("popup.animationSteps", "animationSteps must be >= 1");
    }
    if popup.animation_duration_ms == Some(0) {
        report.warn(
            "popup.animationDurationMs",
            "A zero-length animation shows the final values immediately",
        );
    }
    if popup.cooldown_hours == Some(0) {
        report.warn(
            "popup.cooldownHours",
            "A zero cool-down shows the popup on every visit",
        );
    }
    if let Some(key) = &popup.storage_key {
        if key.trim().is_empty() {
            report.error("popup.storageKey", "Storage key cannot be empty");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_all_defaults;
    use crate::schema::{CounterConfig, PopupConfig, StorageConfig};

    #[test]
    fn defaulted_config_is_valid() {
        let report = validate(&apply_all_defaults(FolioConfig::default()));
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn sqlite_without_path_is_error() {
        let mut cfg = FolioConfig::default();
        cfg.storage = Some(StorageConfig {
            backend: Some(StorageBackend::Sqlite),
            path: Some("  ".into()),
        });
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "storage.path");
    }

    #[test]
    fn zero_animation_steps_is_error() {
        let mut cfg = FolioConfig::default();
        cfg.popup = Some(PopupConfig {
            animation_steps: Some(0),
            ..Default::default()
        });
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert!(report.errors[0].path.contains("animationSteps"));
    }

    #[test]
    fn slash_wrapped_document_path_is_error() {
        let mut cfg = FolioConfig::default();
        cfg.counter = Some(CounterConfig {
            document_path: Some("/visitors/counter".into()),
            ..Default::default()
        });
        assert!(!validate(&cfg).is_valid());
    }
}
