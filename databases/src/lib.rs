//! MolView Databases Module
//!
//! Read-only access to the SQLite store holding the `molecules` table.

pub mod sqlite;

pub use sqlite::{MoleculeStore, StoreError, XyzPath};
