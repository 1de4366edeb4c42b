// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones win:
//! 1. TOML file (base values)
//! 2. Environment variables (deployment overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{AtlasConfig, ConfigError, ConfigResult};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "atlas_configuration.toml";

/// Find the atlas configuration file
///
/// Search order:
/// 1. `ATLAS_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("ATLAS_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by ATLAS_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet ATLAS_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Validation is a separate step, see [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<AtlasConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: AtlasConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `ATLAS_API_HOST` -> `api.host`
/// - `ATLAS_API_PORT` -> `api.port`
/// - `ATLAS_BOSS_URL` -> `boss.base_url`
/// - `ATLAS_BOSS_TOKEN` -> `boss.auth_token`
/// - `ATLAS_DB_PATH` -> `database.path`
/// - `ATLAS_MAX_CONCURRENT_CHECKS` -> `query.max_concurrent_checks`
/// - `ATLAS_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(config: &mut AtlasConfig) {
    if let Ok(value) = env::var("ATLAS_API_HOST") {
        config.api.host = value;
    }
    if let Ok(value) = env::var("ATLAS_API_PORT") {
        if let Ok(port) = value.parse::<u16>() {
            config.api.port = port;
        }
    }

    if let Ok(value) = env::var("ATLAS_BOSS_URL") {
        config.boss.base_url = value;
    }
    if let Ok(value) = env::var("ATLAS_BOSS_TOKEN") {
        config.boss.auth_token = value;
    }

    if let Ok(value) = env::var("ATLAS_DB_PATH") {
        config.database.path = PathBuf::from(value);
    }

    if let Ok(value) = env::var("ATLAS_MAX_CONCURRENT_CHECKS") {
        if let Ok(checks) = value.parse::<usize>() {
            config.query.max_concurrent_checks = checks;
        }
    }

    if let Ok(value) = env::var("ATLAS_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of CLI arguments (e.g., `{"api_port": "9000", "db_path": "/data/pinky.db"}`)
pub fn apply_cli_overrides(config: &mut AtlasConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("api_host") {
        config.api.host = value.clone();
    }
    if let Some(value) = cli_args.get("api_port") {
        if let Ok(port) = value.parse::<u16>() {
            config.api.port = port;
        }
    }

    if let Some(value) = cli_args.get("boss_url") {
        config.boss.base_url = value.clone();
    }

    if let Some(value) = cli_args.get("db_path") {
        config.database.path = PathBuf::from(value);
    }

    if let Some(value) = cli_args.get("max_concurrent_checks") {
        if let Ok(checks) = value.parse::<usize>() {
            config.query.max_concurrent_checks = checks;
        }
    }

    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
}
