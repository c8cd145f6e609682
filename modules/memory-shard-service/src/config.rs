use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Value expected in the `X-API-KEY` header. Empty means every protected
    /// route rejects.
    pub api_key: String,
    pub allowed_origin: String,
    pub host: String,
    pub port: u16,
    pub shard_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("MEMORY_API_KEY").unwrap_or_default(),
            allowed_origin: env::var("ALLOWED_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            host: env::var("MEMORY_SHARD_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10000),
            shard_path: env::var("MEMORY_SHARD_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data/memory_shards.jsonl")),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
