//! SQLite Molecule Store
//!
//! Read-only access to the `molecules` table. Every operation opens its own
//! connection on a blocking worker thread and drops it before returning, so
//! no connection outlives the request that needed it, whether the query
//! succeeded or not.

use molview_core::{ChartPoint, DatabaseConfig, MoleculeDetails, MoleculeSummary, StoredValue};
use rusqlite::types::{Type, ValueRef};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised by the molecule store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open SQLite database {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Failed to {operation}: {source}")]
    Query {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Store task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// `xyz_filepath` of an existing row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XyzPath {
    /// Path as stored, possibly empty
    Stored(String),
    /// The column is NULL
    Unset,
}

/// Handle on the molecule database.
///
/// Holds only the location and connection settings; cloning is cheap and
/// no connection is kept open between calls.
#[derive(Debug, Clone)]
pub struct MoleculeStore {
    /// Database path
    db_path: PathBuf,
    /// Busy timeout applied to each connection
    busy_timeout: Duration,
}

impl MoleculeStore {
    /// Create a store for the database at `db_path`
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            busy_timeout: Duration::from_millis(DatabaseConfig::default().busy_timeout_ms),
        }
    }

    /// Create a store from the database section of the configuration
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(&config.path).with_busy_timeout(Duration::from_millis(config.busy_timeout_ms))
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Get database path
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a read-only connection. Never creates the database file.
    fn connect(&self) -> Result<Connection> {
        let open_err = |source| StoreError::Open {
            path: self.db_path.display().to_string(),
            source,
        };

        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(open_err)?;
        conn.busy_timeout(self.busy_timeout).map_err(open_err)?;

        Ok(conn)
    }

    /// Run `query` against a fresh connection on the blocking pool.
    async fn with_connection<T, F>(&self, operation: &'static str, query: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || {
            let conn = store.connect()?;
            // conn is dropped (and closed) at the end of this closure on both paths
            query(&conn).map_err(|source| StoreError::Query { operation, source })
        })
        .await?
    }

    /// Test database connection
    pub async fn test_connection(&self) -> Result<bool> {
        debug!("Testing SQLite connection to {}", self.db_path.display());

        let count = self
            .with_connection("count molecules", |conn| {
                conn.query_row("SELECT COUNT(*) FROM molecules;", [], |row| row.get::<_, i64>(0))
            })
            .await?;

        info!("Molecule store reachable, {count} molecules");
        Ok(true)
    }

    /// List all molecules ordered by name
    pub async fn list_molecules(&self) -> Result<Vec<MoleculeSummary>> {
        debug!("Listing molecules");

        let molecules = self
            .with_connection("list molecules", |conn| {
                let mut stmt = conn.prepare(
                    "SELECT molecule_id, molecule_name FROM molecules ORDER BY molecule_name;",
                )?;
                let rows = stmt.query_map([], |row| {
                    Ok(MoleculeSummary {
                        molecule_id: row.get(0)?,
                        molecule_name: text_column(row, 1)?,
                    })
                })?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            })
            .await?;

        debug!("Found {} molecules", molecules.len());
        Ok(molecules)
    }

    /// Free energy per molecule, ordered by id
    pub async fn chart_points(&self) -> Result<Vec<ChartPoint>> {
        debug!("Loading chart points");

        let points = self
            .with_connection("load chart points", |conn| {
                let mut stmt = conn.prepare(
                    "SELECT molecule_id, molecule_name, molecular_formula, free_energy
                     FROM molecules ORDER BY molecule_id;",
                )?;
                let rows = stmt.query_map([], |row| {
                    Ok(ChartPoint {
                        molecule_id: row.get(0)?,
                        molecule_name: text_column(row, 1)?,
                        molecular_formula: stored_column(row, 2)?,
                        free_energy: stored_column(row, 3)?,
                    })
                })?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            })
            .await?;

        debug!("Loaded {} chart points", points.len());
        Ok(points)
    }

    /// Get the stored coordinate file path of a molecule
    pub async fn xyz_filepath(&self, molecule_id: i64) -> Result<Option<XyzPath>> {
        debug!("Looking up XYZ path for molecule {molecule_id}");

        let path = self
            .with_connection("look up XYZ path", move |conn| {
                conn.query_row(
                    "SELECT xyz_filepath FROM molecules WHERE molecule_id = ?1;",
                    params![molecule_id],
                    |row| text_column(row, 0),
                )
                .optional()
            })
            .await?;

        match path {
            Some(Some(p)) => Ok(Some(XyzPath::Stored(p))),
            Some(None) => Ok(Some(XyzPath::Unset)),
            None => {
                warn!("Molecule not found: {molecule_id}");
                Ok(None)
            }
        }
    }

    /// Get the detail record of a molecule
    pub async fn molecule_details(&self, molecule_id: i64) -> Result<Option<MoleculeDetails>> {
        debug!("Getting molecule details: {molecule_id}");

        let details = self
            .with_connection("load molecule details", move |conn| {
                conn.query_row(
                    "SELECT molecule_id, molecule_name, pubchem_cid, molecular_formula,
                            molecular_weight, free_energy, created_date
                     FROM molecules WHERE molecule_id = ?1;",
                    params![molecule_id],
                    |row| {
                        Ok(MoleculeDetails {
                            molecule_id: row.get(0)?,
                            molecule_name: text_column(row, 1)?,
                            pubchem_cid: stored_column(row, 2)?,
                            molecular_formula: stored_column(row, 3)?,
                            molecular_weight: stored_column(row, 4)?,
                            free_energy: stored_column(row, 5)?,
                            created_date: stored_column(row, 6)?,
                        })
                    },
                )
                .optional()
            })
            .await?;

        if details.is_none() {
            warn!("Molecule not found: {molecule_id}");
        }
        Ok(details)
    }
}

fn conversion_error(idx: usize, ty: Type, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, ty, msg.into())
}

/// Text column that tolerates numbers stored in it (SQLite is loosely typed).
fn text_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(stored_column(row, idx)?.map(|value| match value {
        StoredValue::Integer(i) => i.to_string(),
        StoredValue::Real(r) => r.to_string(),
        StoredValue::Text(t) => t,
    }))
}

/// Column value passed through with the type it was stored as.
fn stored_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<StoredValue>> {
    match row.get_ref(idx)? {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(i) => Ok(Some(StoredValue::Integer(i))),
        ValueRef::Real(r) => Ok(Some(StoredValue::Real(r))),
        ValueRef::Text(bytes) => String::from_utf8(bytes.to_vec())
            .map(|t| Some(StoredValue::Text(t)))
            .map_err(|e| conversion_error(idx, Type::Text, e.to_string())),
        ValueRef::Blob(_) => Err(conversion_error(idx, Type::Blob, "binary value".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn seeded_store() -> (NamedTempFile, MoleculeStore) {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = Connection::open(temp_file.path()).unwrap();
        conn.execute_batch(
            "CREATE TABLE molecules (
                molecule_id INTEGER PRIMARY KEY,
                molecule_name TEXT,
                pubchem_cid INTEGER,
                molecular_formula TEXT,
                molecular_weight REAL,
                free_energy REAL,
                created_date TEXT,
                xyz_filepath TEXT
            );
            INSERT INTO molecules VALUES (1, 'Water', 962, 'H2O', 18.015, -76.4, '2024-05-01 12:00:00', 'water.xyz');
            INSERT INTO molecules VALUES (2, 'benzene', 241, 'C6H6', 78.11, -232.2, '2024-05-02 08:30:00', '/data/benzene.xyz');
            INSERT INTO molecules VALUES (3, 'Ammonia', 'CID222', 'H3N', 'N/A', 'pending', NULL, 'ammonia.xyz');
            INSERT INTO molecules (molecule_id, molecule_name, xyz_filepath) VALUES (4, NULL, NULL);",
        )
        .unwrap();
        drop(conn);

        let store = MoleculeStore::new(temp_file.path());
        (temp_file, store)
    }

    #[tokio::test]
    async fn test_store_connection() {
        let (_file, store) = seeded_store();
        assert!(store.test_connection().await.unwrap());
    }

    #[tokio::test]
    async fn test_list_molecules_sorted_by_name() {
        let (_file, store) = seeded_store();

        let molecules = store.list_molecules().await.unwrap();
        let names: Vec<Option<&str>> = molecules.iter().map(|m| m.molecule_name.as_deref()).collect();

        // NULL sorts first; BINARY collation puts uppercase before lowercase
        assert_eq!(names, vec![None, Some("Ammonia"), Some("Water"), Some("benzene")]);
        assert_eq!(molecules[2].molecule_id, 1);
    }

    #[tokio::test]
    async fn test_chart_points_sorted_by_id() {
        let (_file, store) = seeded_store();

        let points = store.chart_points().await.unwrap();
        let ids: Vec<i64> = points.iter().map(|p| p.molecule_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(points[1].free_energy, Some(StoredValue::Real(-232.2)));
        assert_eq!(points[2].free_energy, Some(StoredValue::Text("pending".to_string())));
        assert_eq!(points[3].free_energy, None);
    }

    #[tokio::test]
    async fn test_molecule_details() {
        let (_file, store) = seeded_store();

        let water = store.molecule_details(1).await.unwrap().unwrap();
        assert_eq!(water.molecule_name.as_deref(), Some("Water"));
        assert_eq!(water.pubchem_cid, Some(StoredValue::Integer(962)));
        assert_eq!(water.molecular_formula, Some(StoredValue::Text("H2O".to_string())));
        assert_eq!(water.molecular_weight, Some(StoredValue::Real(18.015)));
        assert_eq!(
            water.created_date,
            Some(StoredValue::Text("2024-05-01 12:00:00".to_string()))
        );

        assert!(store.molecule_details(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_molecule_details_keep_stored_values() {
        let (_file, store) = seeded_store();

        let ammonia = store.molecule_details(3).await.unwrap().unwrap();
        assert_eq!(ammonia.pubchem_cid, Some(StoredValue::Text("CID222".to_string())));
        assert_eq!(ammonia.molecular_weight, Some(StoredValue::Text("N/A".to_string())));
        assert_eq!(ammonia.free_energy, Some(StoredValue::Text("pending".to_string())));
        assert_eq!(ammonia.created_date, None);

        let unnamed = store.molecule_details(4).await.unwrap().unwrap();
        assert_eq!(unnamed.molecule_name, None);
        assert_eq!(unnamed.pubchem_cid, None);
        assert_eq!(unnamed.molecular_weight, None);

        assert!(store.molecule_details(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_xyz_filepath_lookup() {
        let (_file, store) = seeded_store();

        assert_eq!(
            store.xyz_filepath(1).await.unwrap(),
            Some(XyzPath::Stored("water.xyz".to_string()))
        );
        assert_eq!(
            store.xyz_filepath(2).await.unwrap(),
            Some(XyzPath::Stored("/data/benzene.xyz".to_string()))
        );
        assert_eq!(store.xyz_filepath(4).await.unwrap(), Some(XyzPath::Unset));
        assert!(store.xyz_filepath(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_database_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");
        let store = MoleculeStore::new(&path);
        assert_eq!(store.database_path(), path.as_path());

        assert!(matches!(
            store.list_molecules().await,
            Err(StoreError::Open { path: ref reported, .. }) if *reported == path.display().to_string()
        ));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_missing_table_is_query_error() {
        let temp_file = NamedTempFile::new().unwrap();
        Connection::open(temp_file.path())
            .unwrap()
            .execute_batch("CREATE TABLE other (id INTEGER);")
            .unwrap();
        let store = MoleculeStore::new(temp_file.path());

        let err = store.molecule_details(1).await.unwrap_err();
        assert!(matches!(err, StoreError::Query { .. }));

        // a failed query does not leave the store unusable
        assert!(matches!(
            store.xyz_filepath(1).await,
            Err(StoreError::Query { .. })
        ));
    }

    #[test]
    fn test_connections_are_read_only() {
        let (_file, store) = seeded_store();
        let conn = store.connect().unwrap();

        let result = conn.execute("DELETE FROM molecules;", []);
        assert!(result.is_err());
    }
}
