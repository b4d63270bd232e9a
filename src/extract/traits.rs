use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::options::ExtractionConfig;

/// Delegate failures, translated to a client-safe message at the boundary
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to start extractor: {0}")]
    Spawn(String),
    #[error("extraction timed out after {0}s")]
    Timeout(u64),
    #[error("{0}")]
    Failed(String),
    #[error("extractor reported success but produced no readable file")]
    ArtifactMissing,
}

/// Artifact produced by a successful extraction.
#[derive(Debug, Clone)]
pub enum Extraction {
    /// Media downloaded into the request working directory
    File {
        path: PathBuf,
        title: String,
        ext: String,
    },
    /// A directly fetchable link resolved without downloading
    Remote { url: String },
}

/// The media-resolution/download capability this service wraps.
///
/// The production implementation shells out to yt-dlp; tests inject stubs.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Resolve the URL and produce an artifact in `workdir`.
    ///
    /// A single attempt; the caller owns `workdir` cleanup on failure.
    async fn extract(
        &self,
        url: &str,
        options: &ExtractionConfig,
        workdir: &Path,
    ) -> Result<Extraction, ExtractError>;
}
