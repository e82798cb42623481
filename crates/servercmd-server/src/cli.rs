//! Command-line interface definition using clap.

use std::time::Duration;

use clap::Parser;
use servercmd_api::ApiConfig;
use servercmd_runtime::ExecutorConfig;

/// servercmd - run named server-side commands over HTTP
#[derive(Parser, Debug)]
#[command(name = "servercmd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Host to bind to
    #[arg(long, env = "SERVERCMD_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind to
    #[arg(short, long, env = "SERVERCMD_PORT", default_value_t = 8765)]
    pub port: u16,

    /// Allowed CORS origin (repeatable, default: any)
    #[arg(long = "cors-origin", env = "SERVERCMD_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Seconds a finished execution stays readable after its last access
    #[arg(long, env = "SERVERCMD_RETENTION_SECS", default_value_t = 120)]
    pub retention_secs: u64,

    /// Default synchronous-wait budget in milliseconds
    #[arg(long, env = "SERVERCMD_SYNC_WAIT_MS", default_value_t = 100)]
    pub sync_wait_ms: u64,
}

impl Cli {
    /// Get the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    /// Builds the executor configuration.
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig::new().with_retention(Duration::from_secs(self.retention_secs))
    }

    /// Builds the API configuration.
    pub fn api_config(&self) -> ApiConfig {
        let config = ApiConfig::new(self.host.clone(), self.port)
            .with_default_sync_wait(Duration::from_millis(self.sync_wait_ms));
        if self.cors_origins.is_empty() {
            config
        } else {
            config.with_cors_origins(self.cors_origins.clone())
        }
    }
}
