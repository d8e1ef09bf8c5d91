//! API error type and its mapping onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use molview_databases::StoreError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failures surfaced by the molecule handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Molecule not found")]
    MoleculeNotFound,

    #[error("XYZ file not found on server")]
    XyzFileNotFound,

    #[error("Molecule has no XYZ file path")]
    XyzPathUnset,

    #[error("Invalid molecule id: {0:?}")]
    InvalidMoleculeId(String),

    /// Any other coordinate file read failure; the message is returned as-is
    #[error("{0}")]
    FileRead(#[source] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// JSON body of every handled failure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MoleculeNotFound | ApiError::XyzFileNotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidMoleculeId(_) => StatusCode::BAD_REQUEST,
            ApiError::XyzPathUnset | ApiError::FileRead(_) | ApiError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            // store failures stay opaque to the caller
            ApiError::Store(e) => {
                error!("Molecule store failure: {e}");
                return (status, "Internal Server Error").into_response();
            }
            ApiError::FileRead(e) => error!("Failed to read XYZ file: {e}"),
            _ => {}
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
