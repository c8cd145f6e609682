//! Memory shard service: an append-only JSON-lines store for memory shards,
//! a PII masking filter, and the axum API in front of them.

pub mod auth;
pub mod config;
pub mod identity;
pub mod pii;
pub mod routes;
pub mod store;
pub mod validate;

pub use config::Config;
pub use routes::{AppState, build_router};
pub use store::{ShardStore, StoreError};
