//! Executor configuration.

use std::time::Duration;

/// Configuration for the command executor.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// How long a finished execution stays readable after its last access.
    pub retention: Duration,
    /// Capacity of the execution event broadcast channel.
    pub event_capacity: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            retention: Duration::from_secs(120),
            event_capacity: 256,
        }
    }
}

impl ExecutorConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retention window for finished executions.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Sets the event channel capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExecutorConfig::default();

        assert_eq!(config.retention, Duration::from_secs(120));
        assert_eq!(config.event_capacity, 256);
    }

    #[test]
    fn test_config_builder() {
        let config = ExecutorConfig::new()
            .with_retention(Duration::from_millis(50))
            .with_event_capacity(0);

        assert_eq!(config.retention, Duration::from_millis(50));
        assert_eq!(config.event_capacity, 1);
    }
}
