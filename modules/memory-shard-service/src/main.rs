//! Memory Shard Service: standalone binary serving the shard store API.
//!
//! Default: http://0.0.0.0:10000/

use memory_shard_service::{AppState, Config, ShardStore, build_router};
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    if config.api_key.is_empty() {
        log::warn!("MEMORY_API_KEY not set, protected routes will reject every request");
    }

    let store = Arc::new(
        ShardStore::open(&config.shard_path).expect("Failed to open shard store"),
    );
    log::info!("Shard store opened at: {}", store.path().display());

    let addr = config.bind_addr();
    let state = Arc::new(AppState {
        store,
        config,
        start_time: Instant::now(),
    });

    let app = build_router(state);

    log::info!("Memory Shard Service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server error");
}
