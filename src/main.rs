use anyhow::Context;
use clap::Parser;
use factory_status::adapters::start_api_server;
use factory_status::cli::{self, Cli, Commands};
use factory_status::config::AppConfig;
use factory_status::services::SourceGateway;
use tracing::info;

mod main_runtime;

use main_runtime::{init_logging, init_logging_simple};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config_dir)
        .with_context(|| format!("loading configuration from {}", cli.config_dir.display()))?;
    if let Err(errors) = config.validate() {
        anyhow::bail!("invalid configuration: {}", errors.join("; "));
    }

    match cli.command_or_default() {
        Commands::Serve { port } => {
            init_logging(&config.logging);
            let port = port.unwrap_or(config.server.port);
            info!(port, "Starting factory-status");

            let source = cli::database_source(&config)?;
            start_api_server(SourceGateway::new(source), config, port).await?;
        }
        Commands::Snapshot { fixture, pretty } => {
            init_logging_simple();
            let source = match &fixture {
                Some(path) => cli::fixture_source(path)
                    .with_context(|| format!("reading fixture {}", path.display()))?,
                None => cli::database_source(&config)?,
            };
            let text = cli::render_snapshot(source, &config, pretty).await?;
            println!("{text}");
        }
    }

    Ok(())
}
