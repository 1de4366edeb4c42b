// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Collects every problem in a loaded configuration instead of stopping at
//! the first one, so an operator can fix the file in a single pass.

use crate::{AtlasConfig, ConfigError, ConfigResult};

/// Levels accepted by `logging.level`
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Highest resolution level for which `2^resolution` still fits an i64 shift
const RESOLUTION_CEILING: u32 = 62;

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    InvalidPortRange { port_name: String, port: u16 },
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPortRange { port_name, port } => {
                write!(
                    f,
                    "Port {} = {} is outside valid range (1024-65535)",
                    port_name, port
                )
            }
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - API port range (1024-65535)
/// - Required fields (api host, boss base url, database path)
/// - Valid value ranges (concurrency, timeouts, resolution cap, log level)
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` with details if validation fails
pub fn validate_config(config: &AtlasConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_port_ranges(config, &mut errors);
    validate_required_fields(config, &mut errors);
    validate_value_ranges(config, &mut errors);

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

fn validate_port_ranges(config: &AtlasConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.api.port < 1024 {
        errors.push(ConfigValidationError::InvalidPortRange {
            port_name: "api.port".to_string(),
            port: config.api.port,
        });
    }
}

fn validate_required_fields(config: &AtlasConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.api.host.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "api.host".to_string(),
        });
    }

    if config.boss.base_url.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "boss.base_url".to_string(),
        });
    } else if !config.boss.base_url.starts_with("http://")
        && !config.boss.base_url.starts_with("https://")
    {
        errors.push(ConfigValidationError::InvalidValue {
            field: "boss.base_url".to_string(),
            reason: "must start with http:// or https://".to_string(),
        });
    }

    if config.database.path.as_os_str().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "database.path".to_string(),
        });
    }
}

fn validate_value_ranges(config: &AtlasConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.query.max_concurrent_checks == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "query.max_concurrent_checks".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    if config.database.pool_size == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "database.pool_size".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    if config.boss.request_timeout_ms == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "boss.request_timeout_ms".to_string(),
            reason: "must be positive".to_string(),
        });
    }

    if config.query.max_resolution > RESOLUTION_CEILING {
        errors.push(ConfigValidationError::InvalidValue {
            field: "query.max_resolution".to_string(),
            reason: format!("must not exceed {}", RESOLUTION_CEILING),
        });
    }

    if !LOG_LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("must be one of {}", LOG_LEVELS.join(", ")),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AtlasConfig::default();
        let result = validate_config(&config);
        if let Err(e) = &result {
            eprintln!("Validation error: {}", e);
        }
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_port_range() {
        let mut config = AtlasConfig::default();
        config.api.port = 80;

        let result = validate_config(&config);
        let Err(ConfigError::ValidationError(msg)) = result else {
            panic!("expected validation error");
        };
        assert!(msg.contains("api.port"));
        assert!(msg.contains("1024-65535"));
    }

    #[test]
    fn test_base_url_scheme() {
        let mut config = AtlasConfig::default();
        config.boss.base_url = "boss.local/v1/".to_string();

        let Err(ConfigError::ValidationError(msg)) = validate_config(&config) else {
            panic!("expected validation error");
        };
        assert!(msg.contains("boss.base_url"));
        assert!(msg.contains("http://"));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = AtlasConfig::default();
        config.query.max_concurrent_checks = 0;

        let Err(ConfigError::ValidationError(msg)) = validate_config(&config) else {
            panic!("expected validation error");
        };
        assert!(msg.contains("query.max_concurrent_checks"));
    }

    #[test]
    fn test_empty_connection_pool_rejected() {
        let mut config = AtlasConfig::default();
        config.database.pool_size = 0;

        let Err(ConfigError::ValidationError(msg)) = validate_config(&config) else {
            panic!("expected validation error");
        };
        assert!(msg.contains("database.pool_size"));
    }

    #[test]
    fn test_all_problems_reported_together() {
        let mut config = AtlasConfig::default();
        config.api.host = String::new();
        config.query.max_resolution = 64;
        config.logging.level = "verbose".to_string();

        let Err(ConfigError::ValidationError(msg)) = validate_config(&config) else {
            panic!("expected validation error");
        };
        assert!(msg.contains("api.host"));
        assert!(msg.contains("query.max_resolution"));
        assert!(msg.contains("logging.level"));
        assert_eq!(msg.lines().count(), 4);
    }
}
