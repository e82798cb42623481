//! Application state shared across handlers.

use std::sync::Arc;

use servercmd_runtime::CommandExecutor;

use crate::config::ApiConfig;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// The engine serving all requests.
    pub executor: CommandExecutor,
}

impl AppState {
    /// Creates a new AppState.
    pub fn new(config: ApiConfig, executor: CommandExecutor) -> Self {
        Self {
            config: Arc::new(config),
            executor,
        }
    }
}
