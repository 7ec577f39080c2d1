pub mod ids;
pub mod model;
pub mod outcomes;

pub use ids::*;
pub use model::*;
pub use outcomes::*;
