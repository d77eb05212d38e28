//! Shared application state for the stepwise server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use stepwise_core::{AttemptService, Host, WidgetSettings};

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Attempt operations against the configured host
    pub service: Arc<AttemptService>,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create an AppState backed by in-memory collaborators
    pub fn new() -> Self {
        Self::with_host(Host::in_memory(), WidgetSettings::default())
    }

    pub fn with_host(host: Host, widget: WidgetSettings) -> Self {
        Self::with_service(AttemptService::new(host, widget))
    }

    /// Create AppState around an existing service (for testing)
    pub fn with_service(service: AttemptService) -> Self {
        Self {
            service: Arc::new(service),
            started_at: Utc::now(),
        }
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
