// Common types and utilities for participation handlers

use axum::{
    body::Bytes,
    extract::rejection::BytesRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{error, warn};

use crate::types::ErrorResponse;

/// JSON body pretty-printed with tab indentation and a trailing newline
#[derive(Debug)]
pub struct TabJson<T>(pub StatusCode, pub T);

impl<T: Serialize> IntoResponse for TabJson<T> {
    fn into_response(self) -> Response {
        match to_tab_json(&self.1) {
            Ok(body) => (self.0, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
            Err(e) => {
                error!("Failed to encode response body: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

pub fn to_tab_json<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut body = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut body, PrettyFormatter::with_indent(b"\t"));
    value.serialize(&mut serializer)?;
    body.push(b'\n');
    Ok(body)
}

pub type ErrorReply = TabJson<ErrorResponse>;

// Helper type for API responses
pub type ApiResult<T> = Result<TabJson<T>, ErrorReply>;

pub fn error_reply(status: StatusCode, message: impl Into<String>) -> ErrorReply {
    TabJson(status, ErrorResponse::new(message))
}

/// Unwrap a buffered request body. Oversized bodies become a 413 `ErrorResponse`.
pub fn request_body(body: Result<Bytes, BytesRejection>) -> Result<Bytes, ErrorReply> {
    body.map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        error_reply(
            rejection.status(),
            format!("invalid request body: {}", rejection.body_text()),
        )
    })
}

/// Known route, unsupported method
pub async fn method_not_allowed() -> ErrorReply {
    error_reply(StatusCode::METHOD_NOT_ALLOWED, "invalid request method")
}

/// Unknown route
pub async fn not_found() -> ErrorReply {
    error_reply(StatusCode::NOT_FOUND, "invalid request path")
}
