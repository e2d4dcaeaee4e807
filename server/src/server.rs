use crate::catalog::CatalogSource;
use crate::config::{ServerConfig, SourceKind};
use crate::web;
use axum::{routing::get, Router};
use shared::ResponseShape;
use std::path::Path;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Clone)]
pub struct AppState {
    pub source: CatalogSource,
    pub shape: ResponseShape,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> Self {
        let source = match config.source {
            SourceKind::Memory => CatalogSource::builtin(),
            SourceKind::File => CatalogSource::File(config.data_file.clone()),
        };
        Self {
            source,
            shape: config.shape,
        }
    }
}

/// Build the application: JSON API routes first, static files for everything else
pub fn router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/api/hello", get(web::hello))
        .route("/random_song", get(web::random_song))
        .route("/random-song", get(web::random_song))
        .route("/health", get(web::health))
        .fallback_service(ServeDir::new(static_dir))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config);
    match &state.source {
        CatalogSource::InMemory(catalog) => {
            tracing::info!("Serving {} built-in songs", catalog.len())
        }
        CatalogSource::File(path) => {
            tracing::info!("Serving songs from {}", path.display())
        }
    }
    tracing::info!(
        "Random song responses use the {} shape; static files from {}",
        config.shape,
        config.static_dir.display()
    );

    let app = router(state, &config.static_dir);

    tracing::info!("Server listening on {}", config.bind);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    wait_for(tokio::signal::ctrl_c()).await;
    tracing::info!("Shutting down");
}

/// Resolve once `signal` fires; a signal that cannot be installed never fires
async fn wait_for<F>(signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use shared::Song;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{}-{}", Uuid::new_v4(), name))
    }

    fn file_state(path: PathBuf, shape: ResponseShape) -> AppState {
        AppState {
            source: CatalogSource::File(path),
            shape,
        }
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_failed_signal_install_does_not_shut_down() {
        let failing = async { Err::<(), _>(std::io::Error::other("no signal handler")) };
        let waited =
            tokio::time::timeout(std::time::Duration::from_millis(50), wait_for(failing)).await;
        assert!(waited.is_err(), "shutdown fired without a signal");

        let fired = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            wait_for(async { Ok::<(), std::io::Error>(()) }),
        )
        .await;
        assert!(fired.is_ok());
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_requests_logged_at_info() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let app = router(AppState::from_config(&ServerConfig::default()), "static");
        let (status, _) = get_json(app, "/api/hello").await;
        assert_eq!(status, StatusCode::OK);

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("finished processing request"), "{output}");
    }

    #[tokio::test]
    async fn test_hello() {
        let app = router(AppState::from_config(&ServerConfig::default()), "static");
        let (status, body) = get_json(app, "/api/hello").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"message": "Hello from Flask!", "status": "success", "api_version": "1.0"})
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let state = file_state(temp_path("absent.json"), ResponseShape::Flat);
        let (status, body) = get_json(router(state, "static"), "/random_song").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Songs data file not found"}));
    }

    #[tokio::test]
    async fn test_empty_file_is_404_wrapped() {
        let path = temp_path("empty.json");
        tokio::fs::write(&path, "[]").await.unwrap();

        let state = file_state(path.clone(), ResponseShape::Wrapped);
        let (status, body) = get_json(router(state, "static"), "/random-song").await;
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "No songs available", "status": "error"}));
    }

    #[tokio::test]
    async fn test_malformed_file_is_500() {
        let path = temp_path("broken.json");
        tokio::fs::write(&path, "[{\"artist\": \"Queen\",").await.unwrap();

        let state = file_state(path.clone(), ResponseShape::Flat);
        let (status, body) = get_json(router(state, "static"), "/random_song").await;
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Invalid JSON in songs data file"}));
    }

    #[tokio::test]
    async fn test_invalid_record_is_500() {
        let path = temp_path("bad-link.json");
        tokio::fs::write(
            &path,
            r#"[{"artist":"Queen","song":"Innuendo","youtube_link":"https://vimeo.com/1"}]"#,
        )
        .await
        .unwrap();

        let state = file_state(path.clone(), ResponseShape::Flat);
        let (status, body) = get_json(router(state, "static"), "/random_song").await;
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Invalid song record in songs data file"}));
    }

    #[tokio::test]
    async fn test_wrapped_in_memory_song() {
        let state = AppState {
            source: CatalogSource::builtin(),
            shape: ResponseShape::Wrapped,
        };
        let (status, body) = get_json(router(state, "static"), "/random_song").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], shared::SELECTED_MESSAGE);
        let song: Song = serde_json::from_value(body["song"].clone()).unwrap();
        assert!(song.validate().is_ok());
    }

    #[tokio::test]
    async fn test_bundled_data_file() {
        let app = router(AppState::from_config(&ServerConfig::default()), "static");
        let (status, body) = get_json(app, "/random_song").await;

        assert_eq!(status, StatusCode::OK);
        let keys: Vec<&String> = body.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
        let song: Song = serde_json::from_value(body).unwrap();
        assert!(song.validate().is_ok());
        assert!(song.youtube_link.is_some());
    }

    #[tokio::test]
    async fn test_static_fallback() {
        let config = ServerConfig::default();
        let app = router(AppState::from_config(&config), &config.static_dir);

        let index = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(index.status(), StatusCode::OK);

        let missing = app
            .oneshot(
                Request::builder()
                    .uri("/no/such/asset.css")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
