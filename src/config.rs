use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_url() -> String {
    "postgres://localhost/factory".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// HTTP port for the status endpoint
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public cache lifetime advertised on snapshot responses
    #[serde(default = "default_cache_max_age")]
    pub cache_max_age_secs: u32,
}

fn default_port() -> u16 {
    8787
}

fn default_cache_max_age() -> u32 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            cache_max_age_secs: default_cache_max_age(),
        }
    }
}

/// Thresholds and window sizes used while assembling a snapshot
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    /// Heartbeat age after which an `online` session is reported as `stale`
    #[serde(default = "default_stale_after_minutes")]
    pub stale_after_minutes: i64,
    /// Articles per day the content pipeline is expected to publish
    #[serde(default = "default_content_daily_target")]
    pub content_daily_target: u32,
    /// Number of days kept in the daily P&L history
    #[serde(default = "default_daily_pnl_days")]
    pub daily_pnl_days: usize,
    #[serde(default = "default_recent_positions")]
    pub recent_positions: usize,
    #[serde(default = "default_recent_signals")]
    pub recent_signals: usize,
}

fn default_stale_after_minutes() -> i64 {
    30
}

fn default_content_daily_target() -> u32 {
    10
}

fn default_daily_pnl_days() -> usize {
    14
}

fn default_recent_positions() -> usize {
    20
}

fn default_recent_signals() -> usize {
    30
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            stale_after_minutes: default_stale_after_minutes(),
            content_daily_target: default_content_daily_target(),
            daily_pnl_days: default_daily_pnl_days(),
            recent_positions: default_recent_positions(),
            recent_signals: default_recent_signals(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradingConfig {
    /// Suppress the headline balance and report the desk as decommissioned
    #[serde(default)]
    pub decommissioned: bool,
    /// Bankroll the settled P&L is added to
    #[serde(default = "default_starting_balance")]
    pub starting_balance: Decimal,
    /// Reported trading mode while the desk is live (e.g. "paper")
    #[serde(default = "default_trading_mode")]
    pub mode: String,
}

fn default_starting_balance() -> Decimal {
    dec!(1010.00)
}

fn default_trading_mode() -> String {
    "paper".to_string()
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            decommissioned: false,
            starting_balance: default_starting_balance(),
            mode: default_trading_mode(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("database.max_connections", 5)?
            .set_default("server.port", 8787)?
            .set_default("server.cache_max_age_secs", 30)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("FACTORY_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (FACTORY_DATABASE__URL, etc.)
            .add_source(
                Environment::with_prefix("FACTORY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.snapshot.stale_after_minutes <= 0 {
            errors.push("stale_after_minutes must be positive".to_string());
        }

        if self.snapshot.daily_pnl_days == 0 {
            errors.push("daily_pnl_days must be positive".to_string());
        }

        if self.trading.starting_balance < Decimal::ZERO {
            errors.push("starting_balance must not be negative".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
