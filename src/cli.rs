use clap::{Parser, Subcommand};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::adapters::{FixtureStore, PostgresStore, RecordSource};
use crate::config::AppConfig;
use crate::error::Result;
use crate::services::SourceGateway;
use crate::snapshot::build_snapshot;

#[derive(Parser)]
#[command(name = "factory-status")]
#[command(version)]
#[command(about = "Operational status snapshot for the agent factory dashboard", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding default.toml and <FACTORY_ENV>.toml
    #[arg(short, long, default_value = "config", env = "FACTORY_CONFIG_DIR")]
    pub config_dir: PathBuf,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Serve the snapshot over HTTP (default)
    Serve {
        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Build one snapshot and print it as JSON
    Snapshot {
        /// Read record sets from a JSON fixture instead of the database
        #[arg(long)]
        fixture: Option<PathBuf>,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
}

impl Cli {
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve { port: None })
    }
}

/// Record source for the configured database; connections open on first read.
pub fn database_source(config: &AppConfig) -> Result<Arc<dyn RecordSource>> {
    let store = PostgresStore::connect_lazy(&config.database.url, config.database.max_connections)?;
    Ok(Arc::new(store))
}

pub fn fixture_source(path: &Path) -> Result<Arc<dyn RecordSource>> {
    Ok(Arc::new(FixtureStore::from_path(path)?))
}

/// Build one snapshot and render it as JSON text.
pub async fn render_snapshot(source: Arc<dyn RecordSource>, config: &AppConfig, pretty: bool) -> Result<String> {
    let gateway = SourceGateway::new(source);
    let snapshot = build_snapshot(&gateway, config, Utc::now()).await;
    let text = if pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        serde_json::to_string(&snapshot)?
    };
    info!(bytes = text.len(), "Snapshot rendered");
    Ok(text)
}
