//! Parley - multi-session chat client CLI
//!
#![doc = "Parley - multi-session chat client CLI"]
#![doc = "Main entry point for the Parley application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use parley::cli::{Cli, Commands};
use parley::commands;
use parley::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // The formatter needs no endpoint, so it runs before configuration
    if let Commands::Format { input } = &cli.command {
        return commands::format::run_format(input.clone());
    }

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { attach } => {
            if let Some(path) = &attach {
                tracing::debug!("Attaching at startup: {}", path.display());
            }
            commands::chat::run_chat(config, attach).await?;
            Ok(())
        }
        Commands::Ask { prompt, attach } => {
            tracing::info!("Sending one-shot prompt");
            commands::ask::run_ask(config, prompt, attach).await?;
            Ok(())
        }
        Commands::Format { .. } => Ok(()),
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug output.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "parley=debug" } else { "parley=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
