pub mod fetcher;
pub mod gateway;

pub use fetcher::{fetch_bundle, SourceBundle};
pub use gateway::SourceGateway;
