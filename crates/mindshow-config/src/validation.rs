//! Configuration validation
//!
//! Ensures configuration values are in range, finite, and mutually
//! consistent before the control loop starts. All violations are collected
//! and reported together.

use crate::{ConfigError, ConfigResult, MindshowConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    OutOfRange { field: String, reason: String },
    NotFinite { field: String },
    MissingRequired { field: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { field, reason } => {
                write!(f, "Invalid value for {}: {}", field, reason)
            }
            Self::NotFinite { field } => write!(f, "{} must be a finite number", field),
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Thresholds and weights within their documented ranges
/// - Finite numeric values everywhere (a NaN weight would poison every tick)
/// - Positive rates, intervals and timeouts
/// - Non-empty controller names/addresses
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every violation
pub fn validate_config(config: &MindshowConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_system(config, &mut errors);
    validate_classifier(config, &mut errors);
    validate_mood(config, &mut errors);
    validate_throttle(config, &mut errors);
    validate_link(config, &mut errors);
    validate_controllers(config, &mut errors);
    validate_presets(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");
        return Err(ConfigError::ValidationError(error_messages));
    }

    Ok(())
}

fn check_unit_interval(
    field: &str,
    value: f64,
    errors: &mut Vec<ConfigValidationError>,
) {
    if !value.is_finite() {
        errors.push(ConfigValidationError::NotFinite {
            field: field.to_string(),
        });
    } else if !(0.0..=1.0).contains(&value) {
        errors.push(ConfigValidationError::OutOfRange {
            field: field.to_string(),
            reason: "must be between 0.0 and 1.0".to_string(),
        });
    }
}

fn check_positive(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) {
    if !value.is_finite() {
        errors.push(ConfigValidationError::NotFinite {
            field: field.to_string(),
        });
    } else if value <= 0.0 {
        errors.push(ConfigValidationError::OutOfRange {
            field: field.to_string(),
            reason: "must be positive".to_string(),
        });
    }
}

fn validate_system(config: &MindshowConfig, errors: &mut Vec<ConfigValidationError>) {
    check_positive("system.update_rate_hz", config.system.update_rate_hz, errors);
    if config.system.log_level.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "system.log_level".to_string(),
        });
    }
}

fn validate_classifier(config: &MindshowConfig, errors: &mut Vec<ConfigValidationError>) {
    check_unit_interval(
        "classifier.attention_threshold",
        config.classifier.attention_threshold,
        errors,
    );
    check_unit_interval(
        "classifier.relaxation_threshold",
        config.classifier.relaxation_threshold,
        errors,
    );
    if config.classifier.confidence_required == 0 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "classifier.confidence_required".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if !config.classifier.min_dwell_secs.is_finite() || config.classifier.min_dwell_secs < 0.0 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "classifier.min_dwell_secs".to_string(),
            reason: "must be zero or positive".to_string(),
        });
    }
}

fn validate_mood(config: &MindshowConfig, errors: &mut Vec<ConfigValidationError>) {
    for (field, value) in [
        ("mood.attention_weight", config.mood.attention_weight),
        ("mood.relaxation_weight", config.mood.relaxation_weight),
        ("mood.intensity_base", config.mood.intensity_base),
        ("mood.intensity_scale", config.mood.intensity_scale),
    ] {
        if !value.is_finite() {
            errors.push(ConfigValidationError::NotFinite {
                field: field.to_string(),
            });
        }
    }
    if !config.mood.smoothing.is_finite()
        || config.mood.smoothing <= 0.0
        || config.mood.smoothing > 1.0
    {
        errors.push(ConfigValidationError::OutOfRange {
            field: "mood.smoothing".to_string(),
            reason: "must be in (0.0, 1.0]".to_string(),
        });
    }
}

fn validate_throttle(config: &MindshowConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.throttle.min_interval_ms == 0 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "throttle.min_interval_ms".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if !config.throttle.change_threshold.is_finite() || config.throttle.change_threshold < 0.0 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "throttle.change_threshold".to_string(),
            reason: "must be zero or positive".to_string(),
        });
    }
}

fn validate_link(config: &MindshowConfig, errors: &mut Vec<ConfigValidationError>) {
    for (field, value) in [
        ("link.connect_timeout_ms", config.link.connect_timeout_ms),
        ("link.send_timeout_ms", config.link.send_timeout_ms),
        ("link.backoff_base_ms", config.link.backoff_base_ms),
        ("link.backoff_max_ms", config.link.backoff_max_ms),
    ] {
        if value == 0 {
            errors.push(ConfigValidationError::OutOfRange {
                field: field.to_string(),
                reason: "must be positive".to_string(),
            });
        }
    }
    if config.link.backoff_max_ms < config.link.backoff_base_ms {
        errors.push(ConfigValidationError::OutOfRange {
            field: "link.backoff_max_ms".to_string(),
            reason: "must be >= link.backoff_base_ms".to_string(),
        });
    }
}

fn validate_controllers(config: &MindshowConfig, errors: &mut Vec<ConfigValidationError>) {
    for (i, controller) in config.controllers.iter().enumerate() {
        if controller.name.is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: format!("controllers[{}].name", i),
            });
        }
        if controller.address.is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: format!("controllers[{}].address", i),
            });
        }
    }
}

fn validate_presets(config: &MindshowConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.presets.mood_bias_key.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "presets.mood_bias_key".to_string(),
        });
    }
    for (label, preset) in config.presets.all() {
        if preset.pattern.is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: format!("presets.{}.pattern", label),
            });
        }
        for (key, value) in &preset.variables {
            if !value.is_finite() {
                errors.push(ConfigValidationError::NotFinite {
                    field: format!("presets.{}.variables.{}", label, key),
                });
            }
        }
    }
}
