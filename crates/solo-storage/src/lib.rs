pub mod eval;
pub mod mem;
pub mod persistent;
pub mod repository;
pub mod traits;
pub mod walbin;

pub use mem::InMemoryStore;
pub use persistent::{restore, PersistentStore};
pub use traits::*;
