// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! atlas-server - REST server for structural connectome queries

use anyhow::{Context, Result};
use atlas_api::{serve, ApiState};
use atlas_config::{
    apply_cli_overrides, apply_environment_overrides, find_config_file, load_config,
    validate_config, AtlasConfig,
};
use atlas_observability::{debug_flags_help, init_logging, parse_debug_flags, LogSettings};
use atlas_services::AtlasContext;
use clap::Parser;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};

/// Connectome atlas REST server
#[derive(Parser, Debug)]
#[command(name = "atlas-server", version, author, long_about = None, after_help = debug_flags_help())]
struct Args {
    /// Path to atlas_configuration.toml (searched for when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long)]
    host: Option<String>,

    /// Bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// Base URL of the spatial index service
    #[arg(long)]
    boss_url: Option<String>,

    /// SQLite structural database
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Membership checks run concurrently per neuron
    #[arg(long)]
    max_concurrent_checks: Option<usize>,

    /// Default log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(host) = &self.host {
            overrides.insert("api_host".to_string(), host.clone());
        }
        if let Some(port) = self.port {
            overrides.insert("api_port".to_string(), port.to_string());
        }
        if let Some(url) = &self.boss_url {
            overrides.insert("boss_url".to_string(), url.clone());
        }
        if let Some(path) = &self.db_path {
            overrides.insert("db_path".to_string(), path.display().to_string());
        }
        if let Some(checks) = self.max_concurrent_checks {
            overrides.insert("max_concurrent_checks".to_string(), checks.to_string());
        }
        if let Some(level) = &self.log_level {
            overrides.insert("log_level".to_string(), level.clone());
        }
        overrides
    }
}

/// Load the config file, or fall back to defaults when none is found
fn resolve_config(args: &Args) -> Result<(AtlasConfig, Option<PathBuf>)> {
    let overrides = args.overrides();

    let path = match &args.config {
        Some(path) => Some(path.clone()),
        None => find_config_file().ok(),
    };

    let config = match &path {
        Some(path) => load_config(Some(path), Some(&overrides))
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => {
            let mut config = AtlasConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, &overrides);
            config
        }
    };

    validate_config(&config).context("Invalid configuration")?;
    Ok((config, path))
}

#[tokio::main]
async fn main() -> Result<()> {
    // `--debug-{crate}` switches are not clap options
    let (debug_args, clap_args): (Vec<String>, Vec<String>) =
        std::env::args().partition(|arg| arg.starts_with("--debug-"));
    let args = Args::parse_from(clap_args);
    let debug_flags = parse_debug_flags(debug_args);

    let (config, config_path) = resolve_config(&args)?;

    let log_settings = LogSettings {
        level: config.logging.level.clone(),
        file_logging: config.logging.file_logging,
        log_dir: config.logging.log_dir.clone(),
        retention_days: config.logging.retention_days,
        retention_runs: config.logging.retention_runs,
    };
    let _logging_guard = init_logging(&debug_flags, &log_settings)?;

    match &config_path {
        Some(path) => info!(target: "atlas-api", "Configuration loaded from {}", path.display()),
        None => warn!(target: "atlas-api", "No configuration file found, using defaults"),
    }

    let context = AtlasContext::from_config(&config)
        .context("Failed to initialise the service layer")?;

    let addr: SocketAddr = format!("{}:{}", config.api.host, config.api.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.api.host, config.api.port))?;

    info!(target: "atlas-api", "atlas-server {} starting", atlas_api::VERSION);
    serve(ApiState::from_context(&context), addr)
        .await
        .context("HTTP server stopped with an error")?;

    Ok(())
}
