pub mod api_server;
pub mod fixture;
pub mod postgres;
pub mod source;

pub use api_server::start_api_server;
pub use fixture::FixtureStore;
pub use postgres::PostgresStore;
pub use source::{OrderBy, QueryOpts, RecordSource};
