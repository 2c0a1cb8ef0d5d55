//! Configuration validation.

use crate::config::types::StressConfig;
use crate::errors::ConfigError;

/// Validate the merged configuration.
///
/// # Errors
///
/// Returns `ConfigError::InvalidConfiguration` when:
/// - an interval is not a finite, positive number of seconds
/// - `apps.max_processes` is zero (cap enforcement could never make room)
/// - `apps.compositor` or `display.tool` is empty
pub fn validate_config(config: &StressConfig) -> Result<(), ConfigError> {
    validate_interval("apps.interval_secs", config.apps.interval_secs())?;
    validate_interval("display.interval_secs", config.display.interval_secs())?;

    if config.apps.max_processes() == 0 {
        return Err(ConfigError::InvalidConfiguration {
            message: "apps.max_processes must be at least 1".to_string(),
        });
    }

    if config.apps.compositor().trim().is_empty() {
        return Err(ConfigError::InvalidConfiguration {
            message: "apps.compositor cannot be empty".to_string(),
        });
    }

    if config.display.tool().trim().is_empty() {
        return Err(ConfigError::InvalidConfiguration {
            message: "display.tool cannot be empty".to_string(),
        });
    }

    Ok(())
}

fn validate_interval(field: &str, secs: f64) -> Result<(), ConfigError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConfigError::InvalidConfiguration {
            message: format!("{field} must be a positive number of seconds, got {secs}"),
        });
    }
    Ok(())
}
