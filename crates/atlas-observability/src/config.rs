// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging settings consumed by [`crate::init_logging`]

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging settings, usually mapped from the `[logging]` config section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    /// Default level for crates without a debug flag (trace, debug, info, warn, error)
    pub level: String,

    /// Write JSON log files in addition to the console (needs `file-logging`)
    pub file_logging: bool,

    /// Base directory holding one `run_*` folder per process start
    pub log_dir: PathBuf,

    /// Run folders older than this are removed
    pub retention_days: u64,

    /// At most this many run folders are kept
    pub retention_runs: usize,
}

impl Default for LogSettings {
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
