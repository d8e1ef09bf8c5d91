//! CLI argument parsing
//!
//! Flags override values from the configuration file and environment.

use clap::Parser;
use molview_core::ServerConfig;
use std::path::PathBuf;

/// Read-only web backend for molecule metadata and XYZ coordinate files
#[derive(Debug, Clone, Parser)]
#[command(name = "molview", version, about)]
pub struct Args {
    /// Configuration file (TOML); defaults to ./molview.toml when present
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// SQLite database holding the `molecules` table
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// HTML page served at `/`
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Directory served under `/static`
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Base directory for relative XYZ file paths
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `molview_api=debug,info`
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit JSON log lines
    #[arg(long)]
    pub json_logs: bool,
}

impl Args {
    /// Apply command-line overrides on top of a loaded configuration
    pub fn apply_overrides(&self, config: &mut ServerConfig) {
        if let Some(db) = &self.db {
            config.database.path = db.clone();
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(template) = &self.template {
            config.assets.template = template.clone();
        }
        if let Some(static_dir) = &self.static_dir {
            config.assets.static_dir = static_dir.clone();
        }
        if let Some(data_dir) = &self.data_dir {
            config.assets.data_dir = data_dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.json_logs {
            config.logging.json = true;
        }
    }
}
