// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `atlas_configuration.toml`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub api: ApiConfig,
    pub boss: BossConfig,
    pub database: DatabaseConfig,
    pub query: QueryConfig,
    pub logging: LoggingConfig,
}

/// REST API server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Remote id-enumeration service (boss) connection settings
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BossConfig {
    /// Base URL, ending with `/`. Requests go to `{base_url}ids/...`
    pub base_url: String,
    /// Sent verbatim in the `Authorization` header
    pub auth_token: String,
    pub request_timeout_ms: u64,
}

impl BossConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.bossdb.io/v1/".to_string(),
            auth_token: String::new(),
            request_timeout_ms: 30_000,
        }
    }
}

// Keeps the token out of logs
impl fmt::Debug for BossConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BossConfig")
            .field("base_url", &self.base_url)
            .field(
                "auth_token",
                &if self.auth_token.is_empty() { "<unset>" } else { "<redacted>" },
            )
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

/// Structural (relational) store settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database holding the channel / voxel_set / neuron / synapse tables
    pub path: PathBuf,
    pub read_only: bool,
    /// Connections opened on the database; queries beyond this many wait
    pub pool_size: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("structural.db"),
            read_only: true,
            pool_size: 4,
        }
    }
}

/// Region query tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Membership checks evaluated concurrently per neuron (1 = sequential)
    pub max_concurrent_checks: usize,
    /// Deadline for one neuron_children traversal in milliseconds (0 = none)
    pub traversal_timeout_ms: u64,
    /// Highest accepted resolution level
    pub max_resolution: u32,
}

impl QueryConfig {
    pub fn traversal_timeout(&self) -> Option<Duration> {
        (self.traversal_timeout_ms > 0).then(|| Duration::from_millis(self.traversal_timeout_ms))
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_concurrent_checks: 8,
            traversal_timeout_ms: 0,
            max_resolution: 16,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when no per-crate debug flag applies (trace, debug, info, warn, error)
    pub level: String,
    pub file_logging: bool,
    pub log_dir: PathBuf,
    pub retention_days: u64,
    pub retention_runs: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: false,
            log_dir: PathBuf::from("./logs"),
            retention_days: 30,
            retention_runs: 10,
        }
    }
}
