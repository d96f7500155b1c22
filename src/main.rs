//! boxauth - Box OAuth2 token tool
//!
#![doc = "boxauth - Box OAuth2 token tool"]
#![doc = "Main entry point for the boxauth command-line application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use boxauth::cli::Cli;
use boxauth::commands;
use boxauth::config::SdkConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config = SdkConfig::load(&cli.config)?;

    // Validate configuration
    config.validate()?;
    tracing::debug!(?config, "Configuration loaded");

    commands::run(cli.command, config).await
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so command output on stdout stays machine readable.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "boxauth=debug"
    } else {
        "boxauth=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
