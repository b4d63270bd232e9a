//! Observability stubs (metrics, tracing)

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    downloads_accepted: AtomicU64,
    downloads_completed: AtomicU64,
    downloads_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn download_accepted(&self) {
        self.downloads_accepted.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "downloads_accepted", "Metric incremented");
    }

    pub fn download_completed(&self) {
        self.downloads_completed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "downloads_completed", "Metric incremented");
    }

    pub fn download_failed(&self) {
        self.downloads_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "downloads_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            downloads_accepted: self.downloads_accepted.load(Ordering::Relaxed),
            downloads_completed: self.downloads_completed.load(Ordering::Relaxed),
            downloads_failed: self.downloads_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub downloads_accepted: u64,
    pub downloads_completed: u64,
    pub downloads_failed: u64,
}
