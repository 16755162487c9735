pub mod ant;
pub mod config;
pub mod error;
pub mod feed;
pub mod metrics;
pub mod permalink;
pub mod renderers;
pub mod routes;
pub mod services;
pub mod static_resources;

pub use config::{ConfigError, ServerConfig};
pub use error::AppError;
pub use routes::{router, AppState};
