use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::{ResponseShape, SongError};
use std::io;
use std::path::PathBuf;

/// Everything that can go wrong between "load the catalog" and "pick a song"
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("songs data file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("songs data file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("song catalog is empty")]
    Empty,

    #[error("song record {index} is invalid: {source}")]
    InvalidRecord { index: usize, source: SongError },

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl CatalogError {
    /// Map an io failure while reading `path`
    pub fn from_io(err: io::Error, path: PathBuf) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => CatalogError::NotFound(path),
            _ => CatalogError::Unexpected(err.to_string()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::NotFound(_) | CatalogError::Empty => StatusCode::NOT_FOUND,
            CatalogError::Parse(_)
            | CatalogError::InvalidRecord { .. }
            | CatalogError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show a client; parser internals stay in the log
    pub fn public_message(&self) -> String {
        match self {
            CatalogError::NotFound(_) => "Songs data file not found".to_string(),
            CatalogError::Parse(_) => "Invalid JSON in songs data file".to_string(),
            CatalogError::Empty => "No songs available".to_string(),
            CatalogError::InvalidRecord { .. } => {
                "Invalid song record in songs data file".to_string()
            }
            CatalogError::Unexpected(detail) => format!("An error occurred: {detail}"),
        }
    }
}

/// A catalog failure on its way out of the random-song endpoint
#[derive(Debug)]
pub struct ApiError {
    pub error: CatalogError,
    pub shape: ResponseShape,
}

impl ApiError {
    pub fn new(error: CatalogError, shape: ResponseShape) -> Self {
        Self { error, shape }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        if status.is_server_error() {
            tracing::error!("Random song request failed: {}", self.error);
        } else {
            tracing::warn!("Random song request failed: {}", self.error);
        }

        let body = self.shape.error(self.error.public_message());
        (status, Json(body)).into_response()
    }
}
