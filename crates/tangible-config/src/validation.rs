//! Configuration validation
//!
//! This module provides validation logic to ensure configuration values are
//! consistent, within valid ranges, and don't conflict with each other.

use crate::{ConfigError, ConfigResult, DashboardConfig, VoltageLevel};
use std::collections::HashSet;

/// Per-proxy topic prefixes; fixed topics must not shadow them.
const RESERVED_TOPIC_PREFIXES: [&str; 2] = ["proxy_state_update_proxy_", "hub_state_update_proxy_"];

/// Largest magnitude allowed for row/column positions and tile offsets.
/// Keeps `position + offset` well inside `i32`.
pub const MAX_BOARD_EXTENT: i32 = 1 << 16;

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
    DuplicateProxyId { id: u32 },
    TopicConflict { topic: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
            Self::DuplicateProxyId { id } => {
                write!(f, "Proxy id {} is configured more than once", id)
            }
            Self::TopicConflict { topic, reason } => {
                write!(f, "Topic '{}' conflicts: {}", topic, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Non-empty calibration axis lists with finite voltages
/// - Positions and tile offsets within [`MAX_BOARD_EXTENT`]
/// - Unique proxy ids, with the hub origin among them
/// - Distinct, non-reserved fixed topics
/// - Usable broker (non-zero poll timeout) and light controller settings
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &DashboardConfig) -> ConfigResult<()> {
    let errors = collect_validation_errors(config);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

/// Run every validation rule and return all failures
pub fn collect_validation_errors(config: &DashboardConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();

    validate_calibration(config, &mut errors);
    validate_proxies(config, &mut errors);
    validate_topics(config, &mut errors);
    validate_transport(config, &mut errors);

    errors
}

fn validate_calibration(config: &DashboardConfig, errors: &mut Vec<ConfigValidationError>) {
    let axes: [(&str, &[VoltageLevel]); 3] = [
        ("calibration.tile_levels", &config.calibration.tile_levels),
        ("calibration.row_levels", &config.calibration.row_levels),
        ("calibration.column_levels", &config.calibration.column_levels),
    ];

    for (field, levels) in axes {
        if levels.is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: field.to_string(),
            });
        }
        for (index, level) in levels.iter().enumerate() {
            if !level.voltage.is_finite() {
                errors.push(ConfigValidationError::InvalidValue {
                    field: format!("{}[{}].voltage", field, index),
                    reason: format!("{} is not a finite voltage", level.voltage),
                });
            }
        }
    }

    // Tiles above the adjustment table length fail at resolve time; catch it here.
    let adjustment_count = config.calibration.tile_adjustments.len();
    for level in &config.calibration.tile_levels {
        if level.position > 0 && level.position as usize > adjustment_count {
            errors.push(ConfigValidationError::InvalidValue {
                field: "calibration.tile_adjustments".to_string(),
                reason: format!(
                    "tile {} has no adjustment entry ({} entries configured)",
                    level.position, adjustment_count
                ),
            });
        }
    }

    let relative_axes = [
        ("calibration.row_levels", &config.calibration.row_levels),
        ("calibration.column_levels", &config.calibration.column_levels),
    ];
    for (field, levels) in relative_axes {
        for (index, level) in levels.iter().enumerate() {
            if level.position.checked_abs().map_or(true, |abs| abs > MAX_BOARD_EXTENT) {
                errors.push(ConfigValidationError::InvalidValue {
                    field: format!("{}[{}].position", field, index),
                    reason: format!("{} exceeds the board extent of {}", level.position, MAX_BOARD_EXTENT),
                });
            }
        }
    }

    for (index, offset) in config.calibration.tile_adjustments.iter().enumerate() {
        for (component, value) in [("row", offset.row), ("col", offset.col)] {
            if value.checked_abs().map_or(true, |abs| abs > MAX_BOARD_EXTENT) {
                errors.push(ConfigValidationError::InvalidValue {
                    field: format!("calibration.tile_adjustments[{}].{}", index, component),
                    reason: format!("{} exceeds the board extent of {}", value, MAX_BOARD_EXTENT),
                });
            }
        }
    }
}

fn validate_proxies(config: &DashboardConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.proxies.ids.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "proxies.ids".to_string(),
        });
        return;
    }

    let mut seen = HashSet::new();
    for id in &config.proxies.ids {
        if !seen.insert(*id) {
            errors.push(ConfigValidationError::DuplicateProxyId { id: *id });
        }
    }

    if !seen.contains(&config.proxies.hub_origin_id) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "proxies.hub_origin_id".to_string(),
            reason: format!(
                "{} is not one of the configured proxy ids",
                config.proxies.hub_origin_id
            ),
        });
    }
}

fn validate_topics(config: &DashboardConfig, errors: &mut Vec<ConfigValidationError>) {
    let topics = [
        ("topics.animation", &config.topics.animation),
        ("topics.override_topic", &config.topics.override_topic),
    ];

    for (field, topic) in topics {
        if topic.trim().is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: field.to_string(),
            });
            continue;
        }
        if let Some(prefix) = RESERVED_TOPIC_PREFIXES
            .iter()
            .find(|prefix| topic.starts_with(*prefix))
        {
            errors.push(ConfigValidationError::TopicConflict {
                topic: topic.clone(),
                reason: format!("shares the per-proxy prefix '{}'", prefix),
            });
        }
    }

    if config.topics.animation == config.topics.override_topic {
        errors.push(ConfigValidationError::TopicConflict {
            topic: config.topics.animation.clone(),
            reason: "animation and override topics must differ".to_string(),
        });
    }
}

fn validate_transport(config: &DashboardConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.broker.address.trim().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "broker.address".to_string(),
        });
    }

    if config.broker.receive_timeout_ms == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "broker.receive_timeout_ms".to_string(),
            reason: "must be at least 1; a zero poll timeout spins the listener".to_string(),
        });
    }

    if config.light_controller.baud_rate == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "light_controller.baud_rate".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    if config.light_controller.queue_capacity == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "light_controller.queue_capacity".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}
