pub mod errors;
pub mod model;
pub mod query;
pub mod util;

pub use errors::*;
pub use model::*;
pub use query::*;
