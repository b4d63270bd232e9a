use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

use vidgate::api::server::{build_router, cors_layer};
use vidgate::api::state::AppState;
use vidgate::config::Config;
use vidgate::extract::{ExtractError, Extraction, ExtractionConfig, MediaExtractor};

const ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// Canned outcomes for the stub delegate
enum StubOutcome {
    File {
        title: String,
        ext: String,
        bytes: Vec<u8>,
    },
    Remote {
        url: String,
    },
    Fail {
        message: String,
    },
}

/// Stub delegate: records invocations and returns a canned outcome
struct StubExtractor {
    outcome: StubOutcome,
    calls: AtomicUsize,
}

impl StubExtractor {
    fn new(outcome: StubOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaExtractor for StubExtractor {
    async fn extract(
        &self,
        _url: &str,
        _options: &ExtractionConfig,
        workdir: &Path,
    ) -> Result<Extraction, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.outcome {
            StubOutcome::File { title, ext, bytes } => {
                let path = workdir.join(format!("{title}.{ext}"));
                tokio::fs::write(&path, bytes)
                    .await
                    .expect("Failed to write stub artifact");
                Ok(Extraction::File {
                    path,
                    title: title.clone(),
                    ext: ext.clone(),
                })
            }
            StubOutcome::Remote { url } => Ok(Extraction::Remote { url: url.clone() }),
            StubOutcome::Fail { message } => Err(ExtractError::Failed(message.clone())),
        }
    }
}

/// Creates a minimal config for testing, rooted in a temp downloads dir
fn create_test_config(downloads_dir: &Path) -> Config {
    let config_toml = format!(
        r#"
[server]
bind_addr = "127.0.0.1:8080"
downloads_dir = "{}"

[cors]
allowed_origins = ["{ALLOWED_ORIGIN}"]

[extractor]
binary = "yt-dlp"
timeout_secs = 30
retention_secs = 60
        "#,
        downloads_dir.display()
    );

    toml::from_str(&config_toml).expect("Failed to parse test config")
}

/// Builds a test app with an isolated downloads directory and the stub
/// delegate injected through the app state
fn build_test_app(outcome: StubOutcome) -> (Router, Arc<StubExtractor>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path());

    let cors = cors_layer(&config.cors);
    let stub = StubExtractor::new(outcome);
    let state = AppState::new(config, stub.clone());

    let app = build_router(state).layer(cors);

    (app, stub, temp_dir)
}

/// Helper to build a POST /download request
fn post_download_request(url: &str) -> Request<Body> {
    Request::builder()
        .uri("/download")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "url": url }).to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_download_empty_url_rejected_without_delegate_call() {
    let (app, stub, _temp_dir) = build_test_app(StubOutcome::Fail {
        message: "should never run".to_string(),
    });

    let response = app.oneshot(post_download_request("")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(
        body.get("detail")
            .and_then(|v| v.as_str())
            .is_some_and(|detail| detail.contains("URL"))
    );
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_download_whitespace_url_rejected_without_delegate_call() {
    let (app, stub, _temp_dir) = build_test_app(StubOutcome::Fail {
        message: "should never run".to_string(),
    });

    let response = app.oneshot(post_download_request("   \t ")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_download_success_streams_file() {
    let payload = b"not really an mp4".to_vec();
    let (app, stub, _temp_dir) = build_test_app(StubOutcome::File {
        title: "Sample".to_string(),
        ext: "mp4".to_string(),
        bytes: payload.clone(),
    });

    let response = app
        .oneshot(post_download_request("https://www.youtube.com/watch?v=abc123"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(stub.calls(), 1);

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert_eq!(content_type, "video/mp4");

    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(disposition.contains("Sample.mp4"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(body.as_ref(), payload.as_slice());
}

#[tokio::test]
async fn test_download_failure_returns_detail() {
    let (app, stub, _temp_dir) = build_test_app(StubOutcome::Fail {
        message: "This video is unavailable".to_string(),
    });

    let response = app
        .oneshot(post_download_request("https://example.com/video"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(stub.calls(), 1);

    let body = body_json(response).await;
    assert_eq!(
        body.get("detail").and_then(|v| v.as_str()),
        Some("Download failed: This video is unavailable")
    );
}

#[tokio::test]
async fn test_download_failure_removes_working_directory() {
    let (app, _stub, temp_dir) = build_test_app(StubOutcome::Fail {
        message: "boom".to_string(),
    });

    let response = app
        .oneshot(post_download_request("https://example.com/video"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut entries = tokio::fs::read_dir(temp_dir.path()).await.unwrap();
    assert!(entries.next_entry().await.unwrap().is_none());
}

#[tokio::test]
async fn test_download_remote_result_redirects() {
    let (app, _stub, _temp_dir) = build_test_app(StubOutcome::Remote {
        url: "https://cdn.example.com/resolved.mp4".to_string(),
    });

    let response = app
        .oneshot(post_download_request("https://example.com/video"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("https://cdn.example.com/resolved.mp4")
    );
}

#[tokio::test]
async fn test_health_is_constant() {
    let (app, _stub, _temp_dir) = build_test_app(StubOutcome::Fail {
        message: "unused".to_string(),
    });

    let mut bodies = Vec::new();
    for _ in 0..2 {
        let request = Request::builder()
            .uri("/")
            .method("GET")
            .body(Body::empty())
            .unwrap();

        let response = ServiceExt::<Request<Body>>::oneshot(app.clone(), request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        bodies.push(body_json(response).await);
    }

    assert_eq!(bodies[0], bodies[1]);
    assert!(
        bodies[0]
            .get("message")
            .and_then(|v| v.as_str())
            .is_some_and(|message| !message.is_empty())
    );
}

#[tokio::test]
async fn test_cors_preflight_allowed_origin() {
    let (app, _stub, _temp_dir) = build_test_app(StubOutcome::Fail {
        message: "unused".to_string(),
    });

    let request = Request::builder()
        .uri("/download")
        .method("OPTIONS")
        .header(header::ORIGIN, ALLOWED_ORIGIN)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some(ALLOWED_ORIGIN)
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
    let allow_methods = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(allow_methods.contains("POST"));
}

#[tokio::test]
async fn test_cors_preflight_unlisted_origin() {
    let (app, _stub, _temp_dir) = build_test_app(StubOutcome::Fail {
        message: "unused".to_string(),
    });

    let request = Request::builder()
        .uri("/download")
        .method("OPTIONS")
        .header(header::ORIGIN, "http://evil.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn test_cors_simple_response_reflects_origin() {
    let (app, _stub, _temp_dir) = build_test_app(StubOutcome::Fail {
        message: "nope".to_string(),
    });

    let mut request = post_download_request("https://example.com/video");
    request
        .headers_mut()
        .insert(header::ORIGIN, ALLOWED_ORIGIN.parse().unwrap());

    let response = app.oneshot(request).await.unwrap();

    // Error responses still carry the CORS headers for the allowed origin
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some(ALLOWED_ORIGIN)
    );
}
