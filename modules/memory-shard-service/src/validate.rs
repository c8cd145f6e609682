//! Turns a raw `/save_memory` body into a [`NewShard`].

use memory_shard_types::NewShard;
use serde_json::{Map, Value};

pub const REQUIRED_FIELDS: [&str; 7] = [
    "user_id",
    "thread_id",
    "slide_id",
    "glyph_echo",
    "drift_score",
    "seal",
    "content",
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing fields: [{}]", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("{0} must be a string")]
    NotAString(&'static str),
    #[error("drift_score must be numeric")]
    NonNumericDriftScore,
}

/// Parse a request body. Bodies that are not a JSON object are treated as
/// `{}` so the caller gets the full list of missing fields.
pub fn parse_new_shard(body: &[u8]) -> Result<NewShard, ValidationError> {
    let obj = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    new_shard_from_object(&obj)
}

pub fn new_shard_from_object(obj: &Map<String, Value>) -> Result<NewShard, ValidationError> {
    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|k| obj.get(*k).is_none_or(Value::is_null))
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    Ok(NewShard {
        user_id: string_field(obj, "user_id")?,
        thread_id: string_field(obj, "thread_id")?,
        slide_id: string_field(obj, "slide_id")?,
        glyph_echo: string_field(obj, "glyph_echo")?,
        drift_score: drift_score(&obj["drift_score"])?,
        seal: string_field(obj, "seal")?,
        content: string_field(obj, "content")?,
    })
}

fn string_field(obj: &Map<String, Value>, key: &'static str) -> Result<String, ValidationError> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(ValidationError::NotAString(key)),
    }
}

fn drift_score(value: &Value) -> Result<f64, ValidationError> {
    let score = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    score
        .filter(|s| s.is_finite())
        .ok_or(ValidationError::NonNumericDriftScore)
}
