//! API models for the VidGate endpoints.
//!
//! The external contract is small:
//! - `POST /download` accepts a [`DownloadRequest`] and answers with a binary
//!   stream (or a redirect when the delegate resolves a remote link)
//! - `GET /` answers with a constant [`MessageResponse`]
//! - every failure uses the uniform [`ErrorResponse`] body

use serde::{Deserialize, Serialize};

/// Body of `POST /download`. The URL must be non-empty after trimming.
#[derive(Debug, Deserialize, Clone)]
pub struct DownloadRequest {
    pub url: String,
}

/// Constant acknowledgment returned by the health route.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessageResponse {
    pub message: String,
}

/// Uniform error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
