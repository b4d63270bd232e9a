use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{
        HeaderMap, HeaderValue,
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
    },
    response::{IntoResponse, Redirect, Response},
};
use tokio_util::io::ReaderStream;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    error::ApiError,
    models::{DownloadRequest, MessageResponse},
    state::AppState,
    utils,
};
use crate::extract::{Extraction, select_config};

/// Health check endpoint (GET /)
///
/// Constant acknowledgment used for liveness probing; no side effects.
pub async fn health() -> impl IntoResponse {
    Json(MessageResponse {
        message: "VidGate API is running".to_string(),
    })
}

/// Download endpoint (POST /download)
///
/// ## Flow:
/// 1. Reject empty URLs before touching the delegate
/// 2. Create a unique working directory under the downloads root
/// 3. Build extraction options from the platform rules
/// 4. Invoke the delegate and wait for it to finish (single attempt)
/// 5. Stream the artifact back, or redirect when the delegate resolved a
///    remote link without downloading
///
/// Failures are mapped to a uniform `{"detail": ...}` body and the working
/// directory is removed, so no partial file stays behind. Served artifacts
/// are reclaimed after the configured retention window.
pub async fn download(
    State(state): State<AppState>,
    Json(request): Json<DownloadRequest>,
) -> Result<Response, ApiError> {
    let url = request.url.trim().to_string();
    if url.is_empty() {
        return Err(ApiError::InvalidInput);
    }

    state.metrics.download_accepted();

    let workdir = prepare_workdir(&state.config.server.downloads_dir).await?;
    let options = select_config(&url);
    info!(host = %display_host(&url), format = %options.format, "Starting extraction");

    let extraction = match state.extractor.extract(&url, &options, &workdir).await {
        Ok(extraction) => extraction,
        Err(error) => {
            state.metrics.download_failed();
            remove_workdir(&workdir).await;
            return Err(error.into());
        }
    };

    let response = match extraction {
        Extraction::File { path, title, ext } => {
            match file_response(&path, &title, &ext).await {
                Ok(response) => {
                    let retention =
                        Duration::from_secs(state.config.extractor.retention_secs);
                    schedule_workdir_cleanup(workdir, retention);
                    response
                }
                Err(error) => {
                    state.metrics.download_failed();
                    remove_workdir(&workdir).await;
                    return Err(error);
                }
            }
        }
        Extraction::Remote { url: target } => {
            // Nothing was downloaded; reclaim the directory right away
            remove_workdir(&workdir).await;
            Redirect::temporary(&target).into_response()
        }
    };

    state.metrics.download_completed();
    Ok(response)
}

/// Create-if-absent downloads root plus a unique per-request subdirectory,
/// so concurrent requests write distinct paths.
async fn prepare_workdir(downloads_dir: &Path) -> Result<PathBuf, ApiError> {
    let workdir = downloads_dir.join(Uuid::new_v4().to_string());
    tokio::fs::create_dir_all(&workdir)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to create working directory: {e}")))?;
    Ok(workdir)
}

/// Stream the artifact with a media type and an attachment filename hint.
async fn file_response(path: &Path, title: &str, ext: &str) -> Result<Response, ApiError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to read artifact metadata: {e}")))?;
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to open artifact: {e}")))?;

    let filename = format!("{title}.{ext}");
    let media_type = utils::media_type_for_extension(ext);

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(media_type.as_ref())
            .map_err(|e| ApiError::Internal(format!("invalid media type header: {e}")))?,
    );
    headers.insert(
        CONTENT_LENGTH,
        HeaderValue::from_str(&metadata.len().to_string())
            .map_err(|e| ApiError::Internal(format!("invalid content length header: {e}")))?,
    );
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&utils::content_disposition(&filename))
            .map_err(|e| ApiError::Internal(format!("invalid content disposition header: {e}")))?,
    );

    let body = Body::from_stream(ReaderStream::new(file));
    Ok((headers, body).into_response())
}

async fn remove_workdir(workdir: &Path) {
    if let Err(error) = tokio::fs::remove_dir_all(workdir).await {
        if error.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %workdir.display(), %error, "Failed to remove working directory");
        }
    }
}

/// Keep the served artifact around long enough for the stream to finish,
/// then reclaim the disk space.
fn schedule_workdir_cleanup(workdir: PathBuf, retention: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(retention).await;
        remove_workdir(&workdir).await;
    });
}

/// Host portion only; request URLs can carry tokens in their query string
fn display_host(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .unwrap_or_else(|| "<unparseable>".to_string())
}
