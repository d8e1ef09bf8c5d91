//! API Handlers Module
//!
//! Request handlers for the molecule service. Each handler is a single
//! request -> query/read -> respond flow with no state of its own.

use axum::{
    debug_handler,
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Json, Response},
};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::sync::Arc;
use tracing::{debug, warn};

use molview_core::{AssetsConfig, ChartPoint, MoleculeDetails, MoleculeSummary};
use molview_databases::{MoleculeStore, XyzPath};

use crate::error::ApiError;

/// Page served at `/` when the configured template is unavailable
pub const DEFAULT_INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Represents the state of the API server
pub struct ApiState {
    /// Molecule store
    pub store: MoleculeStore,
    /// Template and coordinate file locations
    pub assets: AssetsConfig,
}

/// Health check endpoint
#[debug_handler]
pub async fn health_check() -> Json<HashMap<String, String>> {
    let mut response = HashMap::new();
    response.insert("status".to_string(), "healthy".to_string());
    response.insert("service".to_string(), "molview-api".to_string());
    Json(response)
}

/// Render the front-end page
#[debug_handler]
pub async fn index(State(state): State<Arc<ApiState>>) -> Html<String> {
    let template = &state.assets.template;
    match tokio::fs::read_to_string(template).await {
        Ok(page) => Html(page),
        Err(e) => {
            if e.kind() == ErrorKind::NotFound {
                debug!("Template {} not found, serving built-in page", template.display());
            } else {
                warn!("Failed to read template {}: {e}", template.display());
            }
            Html(DEFAULT_INDEX_HTML.to_string())
        }
    }
}

/// List all molecules ordered by name
#[debug_handler]
pub async fn list_molecules(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<MoleculeSummary>>, ApiError> {
    let molecules = state.store.list_molecules().await?;
    Ok(Json(molecules))
}

/// Free energy per molecule for the front-end chart
#[debug_handler]
pub async fn molecule_chart(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<ChartPoint>>, ApiError> {
    let points = state.store.chart_points().await?;
    Ok(Json(points))
}

/// Get the raw XYZ coordinate file of a molecule
#[debug_handler]
pub async fn get_molecule_xyz(
    State(state): State<Arc<ApiState>>,
    Path(molecule_id): Path<String>,
) -> Result<Response, ApiError> {
    debug!("Fetching XYZ data for molecule {molecule_id}");

    let molecule_id = parse_molecule_id(&molecule_id)?;
    let stored_path = match state.store.xyz_filepath(molecule_id).await? {
        Some(XyzPath::Stored(path)) => path,
        Some(XyzPath::Unset) => {
            warn!("Molecule {molecule_id} has no XYZ file path");
            return Err(ApiError::XyzPathUnset);
        }
        None => return Err(ApiError::MoleculeNotFound),
    };

    // an empty path names no file
    if stored_path.is_empty() {
        return Err(ApiError::XyzFileNotFound);
    }

    let path = state.assets.resolve_xyz_path(&stored_path);
    let xyz_data = tokio::fs::read_to_string(&path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            warn!("XYZ file for molecule {molecule_id} missing: {}", path.display());
            ApiError::XyzFileNotFound
        } else {
            ApiError::FileRead(e)
        }
    })?;

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], xyz_data).into_response())
}

/// Get the detail record of a molecule
#[debug_handler]
pub async fn get_molecule_details(
    State(state): State<Arc<ApiState>>,
    Path(molecule_id): Path<String>,
) -> Result<Json<MoleculeDetails>, ApiError> {
    debug!("Fetching details for molecule {molecule_id}");

    let molecule_id = parse_molecule_id(&molecule_id)?;
    state
        .store
        .molecule_details(molecule_id)
        .await?
        .map(Json)
        .ok_or(ApiError::MoleculeNotFound)
}

/// Accept only a plain run of ASCII digits as a molecule id.
///
/// Ids beyond SQLite's integer range cannot exist in the store.
fn parse_molecule_id(segment: &str) -> Result<i64, ApiError> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::InvalidMoleculeId(segment.to_string()));
    }
    segment.parse::<i64>().map_err(|_| ApiError::MoleculeNotFound)
}
