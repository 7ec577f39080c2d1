pub mod contract;
pub mod fakes;
pub mod types;

pub use types::*;
