//! Response renderers. Rendering is terminal: failures are logged and a bare
//! status goes out instead, nothing propagates back to the handler.

use crate::metrics::RENDERS_TOTAL;
use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

pub const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=UTF-8";

/// Pre-built RSS document.
pub struct RssRenderer {
    content: String,
}

impl RssRenderer {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl IntoResponse for RssRenderer {
    fn into_response(self) -> Response {
        RENDERS_TOTAL.with_label_values(&["rss"]).inc();
        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, RSS_CONTENT_TYPE)
            .body(Body::from(self.content))
            .unwrap_or_else(|e| {
                error!(error = %e, "render rss failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            })
    }
}

/// Logs the cause and answers 500.
pub struct Http500Renderer {
    cause: Box<dyn std::error::Error + Send + Sync>,
}

impl Http500Renderer {
    pub fn new(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}

impl IntoResponse for Http500Renderer {
    fn into_response(self) -> Response {
        RENDERS_TOTAL.with_label_values(&["http500"]).inc();
        error!(error = %self.cause, "internal error");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

pub struct JsonRenderer<T>(pub T);

impl<T: Serialize> IntoResponse for JsonRenderer<T> {
    fn into_response(self) -> Response {
        RENDERS_TOTAL.with_label_values(&["json"]).inc();
        match serde_json::to_vec(&self.0) {
            Ok(body) => Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap_or_else(|e| {
                    error!(error = %e, "render json failed");
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }),
            Err(e) => Http500Renderer::new(e).into_response(),
        }
    }
}
