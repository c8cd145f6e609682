//! `X-API-KEY` check for the protected routes.

use crate::routes::AppState;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use memory_shard_types::ApiResponse;
use std::sync::Arc;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Compares in constant time for equal-length inputs. An empty expected key
/// never matches.
pub fn key_matches(expected: &str, provided: &str) -> bool {
    let (expected, provided) = (expected.as_bytes(), provided.as_bytes());
    if expected.is_empty() || expected.len() != provided.len() {
        return false;
    }
    expected
        .iter()
        .zip(provided)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

fn provided_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let rejection = match provided_key(request.headers()) {
        Some(key) if key_matches(&state.config.api_key, key) => None,
        Some(_) => Some("invalid"),
        None => Some("missing"),
    };

    match rejection {
        None => next.run(request).await,
        Some(reason) => {
            log::warn!(
                "Rejected {} {}: {} API key",
                request.method(),
                request.uri().path(),
                reason
            );
            unauthorized()
        }
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::err("Unauthorized")),
    )
        .into_response()
}
