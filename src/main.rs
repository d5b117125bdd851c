//! Sitechat - the website assistant widget, in your terminal
//!
#![doc = "Sitechat - website chat widget CLI"]
#![doc = "Main entry point for the Sitechat application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sitechat::cli::{Cli, Commands};
use sitechat::commands;
use sitechat::config::Config;

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

    match cli.command {
        Commands::Chat => {
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Ask { message } => {
            tracing::debug!("Asking a single question");
            commands::ask::run_ask(config, message).await?;
            Ok(())
        }
        Commands::Health => {
            commands::health::run_health(config).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never interleave with the transcript on stdout.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "sitechat=debug" } else { "sitechat=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
