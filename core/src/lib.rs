//! MolView Core Module
//!
//! Shared building blocks for the molecule service: the fixed record
//! projections returned by the API and the process-wide configuration.

pub mod config;
pub mod models;

pub use config::{AssetsConfig, ConfigError, DatabaseConfig, ListenConfig, LoggingConfig, ServerConfig};
pub use models::{ChartPoint, MoleculeDetails, MoleculeSummary, StoredValue};
