use std::sync::Arc;

use crate::config::Config;
use crate::extract::MediaExtractor;
use crate::observability::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub extractor: Arc<dyn MediaExtractor>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: Config, extractor: Arc<dyn MediaExtractor>) -> Self {
        Self {
            config: Arc::new(config),
            extractor,
            metrics: Arc::new(Metrics::new()),
        }
    }
}
