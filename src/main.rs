//! MolView server
//!
//! Serves molecule metadata and XYZ coordinate files from a SQLite store.
//! Run with: `molview --db molecules_pubchem.db --port 3000`

mod cli;
mod logging;

use clap::Parser;

use molview_api::ApiServer;
use molview_core::ServerConfig;

use crate::cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::load(args.config.as_deref())?;
    args.apply_overrides(&mut config);
    config.validate()?;

    logging::init_logging(&config.logging)?;
    logging::log_startup(&config);

    ApiServer::new(config).start().await
}
