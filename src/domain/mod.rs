pub mod clock;
pub mod lenient;
pub mod money;
pub mod records;
pub mod roster;

pub use clock::Clock;
pub use records::*;
