pub mod adapters;
pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod snapshot;

pub use config::AppConfig;
pub use error::{FactoryError, Result};
pub use snapshot::{build_snapshot, Snapshot};
