// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # atlas-observability
//!
//! Logging setup shared by the atlas binaries, with per-crate debug flag
//! support.
//!
//! ## Features
//! - `file-logging`: JSON log files per run, with retention cleanup

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known atlas crate names for debug flags
///
/// These are also the `tracing` targets the crates log under.
pub const KNOWN_CRATES: &[&str] = &[
    "atlas-api",
    "atlas-services",
    "atlas-config",
    "atlas-structures",
];
