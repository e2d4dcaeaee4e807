use crate::error::ApiError;
use crate::server::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use shared::{HelloResponse, RandomSongResponse};

/// `GET /api/hello`
pub async fn hello() -> Json<HelloResponse> {
    Json(HelloResponse::default())
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /random_song`: load the catalog, pick one record, format it
#[axum::debug_handler]
pub async fn random_song(
    State(state): State<AppState>,
) -> Result<Json<RandomSongResponse>, ApiError> {
    let catalog = state
        .source
        .load()
        .await
        .map_err(|e| ApiError::new(e, state.shape))?;

    let song = catalog.choose(&mut rand::thread_rng()).clone();
    tracing::debug!("Selected {} out of {} songs", song, catalog.len());

    Ok(Json(state.shape.song(song)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
    }
}
