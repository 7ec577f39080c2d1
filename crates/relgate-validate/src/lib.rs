pub mod classify;
pub mod error;
pub mod resolve;
pub mod rule;

pub use classify::*;
pub use error::*;
pub use resolve::*;
pub use rule::*;
