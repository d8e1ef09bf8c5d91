//! MolView API Module
//!
//! HTTP endpoints that serve molecule metadata and XYZ coordinate files
//! from the molecule store to the browser front end.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ErrorResponse};
pub use handlers::*;
pub use server::*;
