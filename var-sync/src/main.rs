use anyhow::Result;
use clap::Parser;
use var_sync::cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment
    dotenv::dotenv().ok();

    // Initialize tracing for the CLI.
    tracing_subscriber::fmt::init();
    tracing::info!("CLI application startup: tracing initialised, environment loaded");

    let cli = Cli::parse();
    tracing::info!("CLI arguments parsed, invoking run");
    match run(cli).await {
        Ok(code) => {
            tracing::info!(code, "CLI completed");
            std::process::exit(code)
        }
        Err(e) => {
            tracing::error!(error = %e, "CLI exited with error");
            Err(e)
        }
    }
}
