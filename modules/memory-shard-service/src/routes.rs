//! Axum route handlers for the memory shard API.

use crate::auth;
use crate::config::Config;
use crate::identity;
use crate::pii;
use crate::store::{ShardStore, StoreError};
use crate::validate;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Json};
use axum::routing::{MethodRouter, get, post};
use axum::{Router, middleware};
use memory_shard_types::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const OPENAPI_DOC: &str = include_str!("../openapi.json");

pub const DEFAULT_LIMIT: usize = 5;
pub const MAX_LIMIT: usize = 100;

pub struct AppState {
    pub store: Arc<ShardStore>,
    pub config: Config,
    pub start_time: Instant,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.allowed_origin);

    let protected = Router::new()
        .route("/save_memory", json_only(post(save_memory)))
        .route("/latest_memory", json_only(get(latest_memory)))
        .route("/get_memory", json_only(get(get_memory)))
        .route("/privacy_filter", json_only(post(privacy_filter)))
        .route("/reflection_id", json_only(post(reflection_id)))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .route("/health", json_only(get(health)))
        .route("/healthz", json_only(get(health)))
        .route("/openapi.json", json_only(get(openapi)))
        .merge(protected)
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
}

/// Unsupported methods on a known path answer with a JSON 405.
fn json_only(route: MethodRouter<Arc<AppState>>) -> MethodRouter<Arc<AppState>> {
    route.fallback(method_not_allowed)
}

fn cors_layer(allowed_origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(auth::API_KEY_HEADER),
        ]);

    if allowed_origin == "*" {
        return cors.allow_origin(Any);
    }
    match HeaderValue::from_str(allowed_origin) {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            log::warn!("Invalid ALLOWED_ORIGIN {:?}, allowing any origin", allowed_origin);
            cors.allow_origin(Any)
        }
    }
}

fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, String> {
    serde_json::from_slice(body).map_err(|e| format!("Invalid request body: {}", e))
}

fn store_error_status(e: &StoreError) -> StatusCode {
    match e {
        StoreError::InvalidRecord(_) => StatusCode::BAD_REQUEST,
        StoreError::Io(_) | StoreError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =====================================================
// Public Endpoints
// =====================================================

// GET /health, GET /healthz
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthStatus>) {
    let (status, shard_count, error) = match state.store.count() {
        Ok(n) => (StatusCode::OK, n, None),
        Err(e) => {
            log::error!("Health check could not read shard store: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, 0, Some(e.to_string()))
        }
    };
    (
        status,
        Json(HealthStatus {
            ok: error.is_none(),
            ts: chrono::Utc::now().timestamp(),
            version: VERSION.to_string(),
            uptime_secs: state.start_time.elapsed().as_secs(),
            shard_count,
            error,
        }),
    )
}

// GET /openapi.json
pub async fn openapi() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], OPENAPI_DOC)
}

pub async fn not_found() -> (StatusCode, Json<ApiResponse<()>>) {
    (StatusCode::NOT_FOUND, Json(ApiResponse::err("Not found")))
}

pub async fn method_not_allowed() -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ApiResponse::err("Method not allowed")),
    )
}

// =====================================================
// Shard Endpoints
// =====================================================

// POST /save_memory
pub async fn save_memory(
    State(state): State<Arc<AppState>>,
    body: axum::body::Bytes,
) -> (StatusCode, Json<ApiResponse<MemoryItem>>) {
    let shard = match validate::parse_new_shard(&body) {
        Ok(s) => s,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e.to_string()))),
    };

    match state.store.save(shard) {
        Ok(item) => {
            log::info!(
                "Saved shard {} (user={}, thread={})",
                item.request_id,
                item.user_id,
                item.thread_id
            );
            (StatusCode::CREATED, Json(ApiResponse::ok(item)))
        }
        Err(e) => {
            let status = store_error_status(&e);
            if status.is_server_error() {
                log::error!("Failed to save shard: {}", e);
            }
            (status, Json(ApiResponse::err(e.to_string())))
        }
    }
}

// GET /latest_memory
pub async fn latest_memory(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<Option<MemoryItem>>>) {
    match state.store.latest() {
        Ok(item) => (StatusCode::OK, Json(ApiResponse::ok(item))),
        Err(e) => {
            log::error!("Failed to read latest shard: {}", e);
            (store_error_status(&e), Json(ApiResponse::err(e.to_string())))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GetMemoryParams {
    pub limit: Option<String>,
    pub user_id: Option<String>,
    pub thread_id: Option<String>,
    pub slide_id: Option<String>,
    pub seal: Option<String>,
}

impl GetMemoryParams {
    pub fn limit(&self) -> Result<usize, String> {
        match self.limit.as_deref().map(str::trim) {
            None | Some("") => Ok(DEFAULT_LIMIT),
            Some(raw) => raw
                .parse::<usize>()
                .map(|n| n.min(MAX_LIMIT))
                .map_err(|_| format!("limit must be a non-negative integer, got {:?}", raw)),
        }
    }

    pub fn filter(&self) -> ShardFilter {
        fn non_empty(v: &Option<String>) -> Option<String> {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        }
        ShardFilter {
            user_id: non_empty(&self.user_id),
            thread_id: non_empty(&self.thread_id),
            slide_id: non_empty(&self.slide_id),
            seal: non_empty(&self.seal),
        }
    }
}

// GET /get_memory?limit&user_id&thread_id&slide_id&seal
pub async fn get_memory(
    State(state): State<Arc<AppState>>,
    query: Result<Query<GetMemoryParams>, QueryRejection>,
) -> (StatusCode, Json<ApiResponse<MemoryList>>) {
    let Query(params) = match query {
        Ok(q) => q,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e.body_text()))),
    };
    let limit = match params.limit() {
        Ok(l) => l,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e))),
    };

    let filter = params.filter();
    if !filter.is_empty() {
        log::debug!("Listing up to {} shards matching {:?}", limit, filter);
    }

    match state.store.list(limit, &filter) {
        Ok(items) => {
            let count = items.len();
            (StatusCode::OK, Json(ApiResponse::ok(MemoryList { items, count })))
        }
        Err(e) => {
            log::error!("Failed to list shards: {}", e);
            (store_error_status(&e), Json(ApiResponse::err(e.to_string())))
        }
    }
}

// =====================================================
// Utility Endpoints
// =====================================================

// POST /privacy_filter
pub async fn privacy_filter(
    body: axum::body::Bytes,
) -> (StatusCode, Json<ApiResponse<PrivacyFilterResult>>) {
    let req: PrivacyFilterRequest = match parse_json(&body) {
        Ok(r) => r,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e))),
    };

    let report = pii::filter_report(&req.text);
    (
        StatusCode::OK,
        Json(ApiResponse::ok(PrivacyFilterResult {
            text: report.text,
            emails_masked: report.emails_masked,
            phones_masked: report.phones_masked,
        })),
    )
}

// POST /reflection_id
pub async fn reflection_id(
    body: axum::body::Bytes,
) -> (StatusCode, Json<ApiResponse<ReflectionId>>) {
    let req: ReflectionIdRequest = match parse_json(&body) {
        Ok(r) => r,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e))),
    };

    match identity::reflection_id(&req.email) {
        Ok(seal) => (StatusCode::OK, Json(ApiResponse::ok(ReflectionId { seal }))),
        Err(e) => (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e.to_string()))),
    }
}
