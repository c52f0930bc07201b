use thiserror::Error;

/// Main error type for the status service
#[derive(Error, Debug)]
pub enum FactoryError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Query construction errors
    #[error("Invalid query for {table}: {reason}")]
    InvalidQuery { table: String, reason: String },

    // Record set errors
    #[error("Record set unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Fixture error: {0}")]
    Fixture(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl FactoryError {
    pub fn invalid_query(table: &str, reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            table: table.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for FactoryError
pub type Result<T> = std::result::Result<T, FactoryError>;
