//! yt-dlp subprocess delegate

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::options::ExtractionConfig;
use super::traits::{ExtractError, Extraction, MediaExtractor};
use crate::config::ExtractorConfig;

/// Longest delegate message forwarded to clients
const MAX_ERROR_LEN: usize = 300;

/// Invokes the yt-dlp binary with arguments derived from an
/// [`ExtractionConfig`] and resolves the artifact it produces.
pub struct YtDlpExtractor {
    binary: PathBuf,
    timeout: Duration,
}

impl YtDlpExtractor {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    async fn extract(
        &self,
        url: &str,
        options: &ExtractionConfig,
        workdir: &Path,
    ) -> Result<Extraction, ExtractError> {
        let args = build_args(options, workdir, url);
        debug!(binary = %self.binary.display(), "Spawning extractor");

        let command = Command::new(&self.binary).args(&args).output();
        let output = match timeout(self.timeout, command).await {
            Ok(result) => result.map_err(|e| ExtractError::Spawn(e.to_string()))?,
            Err(_) => return Err(ExtractError::Timeout(self.timeout.as_secs())),
        };

        if !output.status.success() {
            let message = failure_message(&output.stderr);
            warn!(error = %message, "Extractor exited with failure");
            return Err(ExtractError::Failed(message));
        }

        let Some(printed) = printed_filepath(&output.stdout) else {
            return Err(ExtractError::ArtifactMissing);
        };

        resolve_artifact(workdir, &printed).await
    }
}

/// Translate an [`ExtractionConfig`] into a yt-dlp argument vector.
///
/// `--print after_move:filepath` makes the delegate report the final
/// artifact path on stdout once post-processing has finished.
fn build_args(options: &ExtractionConfig, workdir: &Path, url: &str) -> Vec<String> {
    let mut args = vec![
        "--print".to_string(),
        "after_move:filepath".to_string(),
        "-o".to_string(),
        "%(title)s.%(ext)s".to_string(),
        "-P".to_string(),
        workdir.to_string_lossy().to_string(),
        "-f".to_string(),
        options.format.clone(),
        "--no-warnings".to_string(),
    ];

    if options.quiet {
        args.push("--quiet".to_string());
    }
    if options.no_playlist {
        args.push("--no-playlist".to_string());
    }
    if let Some(container) = &options.merge_output_format {
        args.push("--merge-output-format".to_string());
        args.push(container.clone());
    }
    if let Some(user_agent) = &options.user_agent {
        args.push("--user-agent".to_string());
        args.push(user_agent.clone());
    }
    for extractor_arg in &options.extractor_args {
        args.push("--extractor-args".to_string());
        args.push(extractor_arg.clone());
    }

    args.push(url.to_string());
    args
}

/// Last path printed by `--print after_move:filepath`
fn printed_filepath(stdout: &[u8]) -> Option<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .next_back()
        .map(ToString::to_string)
}

/// Verify the reported artifact is a readable, non-empty file and derive
/// title and extension from its name.
async fn resolve_artifact(workdir: &Path, printed: &str) -> Result<Extraction, ExtractError> {
    let path = PathBuf::from(printed);
    let path = if path.is_absolute() {
        path
    } else {
        workdir.join(path)
    };

    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|_| ExtractError::ArtifactMissing)?;
    if !metadata.is_file() || metadata.len() == 0 {
        return Err(ExtractError::ArtifactMissing);
    }

    let title = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("video")
        .to_string();
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("mp4")
        .to_string();

    Ok(Extraction::File { path, title, ext })
}

/// Condense delegate stderr into a single client-safe message: the last
/// `ERROR:` line when present, otherwise the last non-empty line, bounded
/// in length.
fn failure_message(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);

    let line = text
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with("ERROR:"))
        .or_else(|| {
            text.lines()
                .rev()
                .map(str::trim)
                .find(|line| !line.is_empty())
        })
        .unwrap_or("extractor did not report a reason");

    let message = line.strip_prefix("ERROR:").map(str::trim).unwrap_or(line);
    message.chars().take(MAX_ERROR_LEN).collect()
}
