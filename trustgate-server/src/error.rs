//! HTTP-facing error taxonomy (spec §7).
//!
//! Every variant maps to exactly one status code and emits the
//! `{ "error": ..., ... }` envelope with CORS headers attached, following
//! the teacher's `PaygateError`/`error_into_response` split in
//! `r402-http::server::paygate` and `r402-http::server::error`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use trustgate_core::payment::PaymentRequiredDocument;

/// Facilitator response bodies are never echoed past this many characters
/// (spec §7).
pub const TRUNCATE_LEN: usize = 200;

/// Truncates `body` to [`TRUNCATE_LEN`] characters at a char boundary.
#[must_use]
pub fn truncate(body: &str) -> String {
    match body.char_indices().nth(TRUNCATE_LEN) {
        Some((idx, _)) => body[..idx].to_owned(),
        None => body.to_owned(),
    }
}

/// The full error taxonomy from spec §7.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No payment proof was presented; carries the requirement document to
    /// emit verbatim.
    #[error("payment required")]
    PaymentMissing(Box<PaymentRequiredDocument>),
    /// A payment proof was presented but failed verification or settlement.
    #[error("payment failed: {0}")]
    PaymentInvalid(String),
    /// The request body was malformed or missing required fields.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// The graph snapshot could not be loaded.
    #[error("knowledge graph unavailable")]
    GraphUnavailable,
    /// The client has exceeded its rate-limit quota.
    #[error("rate limited")]
    RateLimited,
    /// No route matches the request path.
    #[error("not found")]
    NotFound,
    /// The route exists but not for this HTTP method.
    #[error("method not allowed")]
    MethodNotAllowed,
    /// An unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::PaymentMissing(doc) => {
                (StatusCode::PAYMENT_REQUIRED, Json(doc)).into_response()
            }
            Self::PaymentInvalid(reason) => (
                StatusCode::PAYMENT_REQUIRED,
                Json(json!({ "error": "Payment failed", "reason": reason })),
            )
                .into_response(),
            Self::BadRequest(reason) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": reason })),
            )
                .into_response(),
            Self::GraphUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "knowledge graph unavailable" })),
            )
                .into_response(),
            Self::RateLimited => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({ "error": "rate limited" })),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert("Retry-After", "3600".parse().expect("static header value"));
                response
            }
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "not found" })),
            )
                .into_response(),
            Self::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(json!({ "error": "method not allowed" })),
            )
                .into_response(),
            Self::Internal(reason) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": reason })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_caps_at_two_hundred_chars() {
        let long = "x".repeat(500);
        assert_eq!(truncate(&long).len(), TRUNCATE_LEN);
    }

    #[test]
    fn truncate_is_noop_for_short_body() {
        assert_eq!(truncate("oops"), "oops");
    }
}
