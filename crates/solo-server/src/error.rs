use crate::config::ConfigError;
use crate::renderers::Http500Renderer;
use axum::response::{IntoResponse, Response};
use solo_core::{RepositoryError, ServiceError};
use thiserror::Error;

/// Any failure a handler can hit; always answered with a bare 500.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        Http500Renderer::new(self).into_response()
    }
}
