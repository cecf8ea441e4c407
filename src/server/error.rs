use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::capture::CaptureError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("template {0} is missing from embedded assets")]
    MissingTemplate(&'static str),

    #[error("template {0} is not valid UTF-8")]
    TemplateEncoding(&'static str),

    #[error("failed to register template: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("failed to render template: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!("[Server] Request failed: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}
