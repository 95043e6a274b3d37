use std::sync::Arc;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use awssm::cli::Cli;
use awssm::commands::{Operation, handle_operation, resolve_secret};
use awssm::config::{Config, expand_config_path};
use awssm::{AwsSecretStore, AwsSettings, Result, SecretSession};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // No subcommand: print usage
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = match &cli.config.config {
        Some(path) => Config::load_from_path(&expand_config_path(path))?,
        None => Config::load()?,
    };

    // Everything below is validated before the first remote call.
    let secret = resolve_secret(cli.secret, &config)?;
    let operation = Operation::from_command(command)?;

    let settings = AwsSettings {
        profile: cli.config.profile.or_else(|| config.profile()),
        region: cli.config.region.or_else(|| config.region()),
        endpoint_url: cli.config.endpoint_url.or_else(|| config.endpoint_url()),
    };
    let store = AwsSecretStore::connect(&settings).await;

    let session = SecretSession::new(Arc::new(store), secret)
        .with_version_check(config.verify_version() && !cli.config.no_version_check);

    handle_operation(&session, operation).await
}
