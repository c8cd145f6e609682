//! Append-only JSON-lines storage for memory shards.
//!
//! Every save appends one line; queries load and scan the whole file. File
//! order is recency order, so "newest first" is simply reverse line order.

use memory_shard_types::{MemoryItem, NewShard, ShardFilter};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("shard store I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode shard: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("invalid shard: {0}")]
    InvalidRecord(String),
}

pub struct ShardStore {
    path: PathBuf,
    writer: Mutex<File>,
}

impl ShardStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stamp `ts` and `request_id` onto the shard and append it.
    pub fn save(&self, shard: NewShard) -> Result<MemoryItem, StoreError> {
        if !shard.drift_score.is_finite() {
            return Err(StoreError::InvalidRecord(
                "drift_score must be a finite number".to_string(),
            ));
        }

        let item = shard.into_item(
            chrono::Utc::now().timestamp(),
            uuid::Uuid::new_v4().to_string(),
        );
        let mut line = serde_json::to_string(&item)?;
        line.push('\n');

        // One write_all per record keeps lines whole under concurrent saves.
        let mut file = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(line.as_bytes())?;
        file.flush()?;

        Ok(item)
    }

    pub fn latest(&self) -> Result<Option<MemoryItem>, StoreError> {
        Ok(self.load_all()?.pop())
    }

    /// Up to `limit` shards matching `filter`, newest first.
    pub fn list(&self, limit: usize, filter: &ShardFilter) -> Result<Vec<MemoryItem>, StoreError> {
        let items = self
            .load_all()?
            .into_iter()
            .rev()
            .filter(|item| filter.matches(item))
            .take(limit)
            .collect();
        Ok(items)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        Ok(self.load_all()?.len())
    }

    fn load_all(&self) -> Result<Vec<MemoryItem>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut items = Vec::new();
        for (idx, line) in BufReader::new(file).split(b'\n').enumerate() {
            let line = line?;
            if line.iter().all(|b| b.is_ascii_whitespace()) {
                continue;
            }
            match serde_json::from_slice::<MemoryItem>(&line) {
                Ok(item) => items.push(item),
                Err(e) => log::warn!(
                    "Skipping unreadable shard at {}:{}: {}",
                    self.path.display(),
                    idx + 1,
                    e
                ),
            }
        }
        Ok(items)
    }
}
