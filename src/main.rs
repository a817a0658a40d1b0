//! SchoolFinder - conversational school search CLI
//!
#![doc = "SchoolFinder - conversational school search CLI"]
#![doc = "Main entry point for the SchoolFinder application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use schoolfinder::cli::{Cli, Commands};
use schoolfinder::commands;
use schoolfinder::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { mode, resume } => {
            if let Some(m) = &mode {
                tracing::debug!("Using mode override: {}", m);
            }
            if let Some(r) = &resume {
                tracing::debug!("Resuming conversation: {}", r);
            }

            commands::chat::run_chat(config, mode, resume).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(command, &config)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never mix with command output.
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "schoolfinder=debug"
    } else {
        "schoolfinder=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
