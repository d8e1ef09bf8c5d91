//! Structured logging setup.

use molview_core::{LoggingConfig, ServerConfig};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init()?;
    }

    tracing::debug!(level = %config.level, json = config.json, "Logging initialized");
    Ok(())
}

/// Announce the resolved configuration. Call once the subscriber is installed.
pub fn log_startup(config: &ServerConfig) {
    info!("MolView v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded: database={}, listen={}",
        config.database.path.display(),
        config.bind_address()
    );
}
