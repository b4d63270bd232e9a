use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Root directory for per-request working directories
    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            downloads_dir: default_downloads_dir(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().unwrap()
}

fn default_downloads_dir() -> PathBuf {
    PathBuf::from("downloads")
}

/// Cross-origin allow-list
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Origins allowed to call the API with credentials. Each entry is
    /// normalized to `scheme://host[:port]` at load time.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

/// Extraction delegate configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractorConfig {
    /// Path to the yt-dlp binary
    #[serde(default = "default_binary")]
    pub binary: PathBuf,
    /// Overall subprocess timeout per extraction
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Delay before a served working directory is deleted
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            timeout_secs: default_timeout_secs(),
            retention_secs: default_retention_secs(),
        }
    }
}

fn default_binary() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_retention_secs() -> u64 {
    20 * 60
}
