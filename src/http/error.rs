//! Structured handler errors.
//!
//! Handlers never write error bodies themselves. They return an [`AppError`]
//! and the router turns it into a response through `IntoResponse`, so the
//! JSON-versus-text decision lives in one place.

use std::fmt;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub const JSON_MEDIA_TYPE: &str = "application/json";
pub const TEXT_MEDIA_TYPE: &str = "text/plain";

/// A request failure represented as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    code: StatusCode,
    message: String,
    content_type: Option<&'static str>,
    cause: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl AppError {
    fn new(code: StatusCode, cause: Option<String>) -> Self {
        Self {
            code,
            message: cause.clone().unwrap_or_default(),
            content_type: None,
            cause,
        }
    }

    /// 400 carrying `cause` as its message.
    pub fn bad_request(cause: impl fmt::Display) -> Self {
        Self::new(StatusCode::BAD_REQUEST, Some(cause.to_string()))
    }

    /// 500 carrying `cause` as its message.
    pub fn internal_server_error(cause: impl fmt::Display) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, Some(cause.to_string()))
    }

    /// 404 with an empty message.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, None)
    }

    /// Mark the error for JSON encoding.
    pub fn as_json(mut self) -> Self {
        self.content_type = Some(JSON_MEDIA_TYPE);
        self
    }

    /// Replace the client-facing message. The cause is kept for logging.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn is_json(&self) -> bool {
        self.content_type == Some(JSON_MEDIA_TYPE)
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Body bytes as they go on the wire.
    pub fn body(&self) -> String {
        if self.is_json() {
            // Serializing a struct holding a single &str cannot fail.
            serde_json::to_string(&ErrorBody { error: &self.message }).unwrap_or_default()
        } else {
            self.message.clone()
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let cause = self.cause.as_deref().unwrap_or("");
        if self.code.is_server_error() {
            tracing::error!(status = self.code.as_u16(), error = %cause, message = %self.message, "Request failed");
        } else {
            tracing::debug!(status = self.code.as_u16(), error = %cause, message = %self.message, "Request rejected");
        }

        let mut response = (self.code, self.body()).into_response();
        if let Some(content_type) = self.content_type {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        response
    }
}
