use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::SourceGateway;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Record-set reads for every snapshot request
    pub gateway: SourceGateway,

    /// Loaded configuration (thresholds, trading switch, cache lifetime)
    pub config: Arc<AppConfig>,

    /// Application start time
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(gateway: SourceGateway, config: AppConfig) -> Self {
        Self {
            gateway,
            config: Arc::new(config),
            start_time: Utc::now(),
        }
    }

    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds()
    }

    /// `Cache-Control` value for snapshot responses
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.config.server.cache_max_age_secs)
    }
}
