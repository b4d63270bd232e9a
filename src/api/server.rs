use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_DISPOSITION},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tracing::info;

use super::{
    services::{download, health},
    state::AppState,
};
use crate::config::{Config, CorsConfig, normalize_origin};
use crate::extract::YtDlpExtractor;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub async fn run(
    address: Option<SocketAddr>,
    config_path: Option<PathBuf>,
) -> Result<(), AnyError> {
    info!("Loading configuration");
    let config = match config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
    .map_err(|e| format!("Failed to load config: {}", e))?;

    let bind_addr = address.unwrap_or(config.server.bind_addr);
    let cors = cors_layer(&config.cors);

    let extractor = Arc::new(YtDlpExtractor::new(&config.extractor));
    let state = AppState::new(config, extractor);

    let app = build_router(state).layer(cors);

    let listener = TcpListener::bind(bind_addr).await?;
    info!(address = %bind_addr, "VidGate API listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Routes shared by the server and the integration tests.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/download", post(download))
        .with_state(state)
}

/// Allow-list CORS policy: listed origins are reflected back, credentials
/// are allowed, requested headers are mirrored, and the attachment filename
/// header is exposed to browser clients. Preflight `OPTIONS /download` is
/// answered by this layer.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let allowed: Arc<HashSet<String>> = Arc::new(
        config
            .allowed_origins
            .iter()
            .filter_map(|origin| normalize_origin(origin))
            .collect(),
    );

    let allow_origin = AllowOrigin::predicate({
        let allowed = Arc::clone(&allowed);
        move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .ok()
                .and_then(normalize_origin)
                .is_some_and(|normalized| allowed.contains(&normalized))
        }
    });

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .expose_headers([CONTENT_DISPOSITION])
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
