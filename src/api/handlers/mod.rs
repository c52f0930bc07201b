pub mod status;
pub mod system;

pub use status::*;
pub use system::*;
