//! API configuration.

use std::time::{Duration, Instant};

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,
    /// Synchronous-wait budget used when a start request names none.
    pub default_sync_wait: Duration,
    /// Upper bound for a requested synchronous-wait budget.
    pub max_sync_wait: Duration,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl ApiConfig {
    /// Creates a new API configuration with the given host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Sets the CORS origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Sets the default synchronous-wait budget.
    pub fn with_default_sync_wait(mut self, wait: Duration) -> Self {
        self.default_sync_wait = wait;
        self
    }

    /// Sets the largest synchronous-wait budget a request may ask for.
    pub fn with_max_sync_wait(mut self, wait: Duration) -> Self {
        self.max_sync_wait = wait;
        self
    }

    /// Returns the bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Resolves the budget for a start request, clamped to `max_sync_wait`.
    pub fn sync_wait(&self, requested_ms: Option<u64>) -> Duration {
        requested_ms
            .map(Duration::from_millis)
            .unwrap_or(self.default_sync_wait)
            .min(self.max_sync_wait)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8765,
            cors_origins: vec!["*".to_string()],
            default_sync_wait: Duration::from_millis(100),
            max_sync_wait: Duration::from_secs(30),
            start_time: Instant::now(),
        }
    }
}
