//! servercmd entry point.

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use servercmd_api::{serve, AppState};
use servercmd_runtime::CommandExecutor;
use servercmd_server::demo::register_demo_commands;
use servercmd_server::{Cli, Result};

#[tokio::main]
async fn main() {
    // Load .env if it exists (SERVERCMD_* settings)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt().with_env_filter(filter).with_target(false).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let executor = CommandExecutor::new(cli.executor_config());
    register_demo_commands(&executor)?;

    let config = cli.api_config();
    let state = AppState::new(config.clone(), executor);

    tokio::select! {
        result = serve(config, state) => result?,
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("shutdown requested");
        }
    }

    Ok(())
}
