//! Extraction delegate: the trait boundary this service wraps, the yt-dlp
//! subprocess implementation, and per-platform option selection.
//!
//! ## Key Components
//!
//! - [`MediaExtractor`] - Boundary trait; tests inject stubs through it
//! - [`YtDlpExtractor`] - Production implementation shelling out to yt-dlp
//! - [`ExtractionConfig`] / [`select_config`] - Per-platform option table
//! - [`Extraction`] - Artifact produced by a successful extraction

mod options;
mod traits;
mod ytdlp;

pub use options::{
    ExtractionConfig, PLATFORM_RULES, PlatformRule, RuleCategory, select_config,
};
pub use traits::{ExtractError, Extraction, MediaExtractor};
pub use ytdlp::YtDlpExtractor;
