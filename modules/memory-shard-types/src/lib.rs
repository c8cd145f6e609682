//! Shared types for the memory shard service and its RPC clients.

use serde::{Deserialize, Serialize};

// =====================================================
// Domain Types
// =====================================================

/// One persisted memory shard. `ts` and `request_id` are always assigned by
/// the service when the shard is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    pub user_id: String,
    pub thread_id: String,
    pub slide_id: String,
    pub glyph_echo: String,
    pub drift_score: f64,
    pub seal: String,
    pub content: String,
    pub ts: i64,
    pub request_id: String,
}

/// The client-supplied part of a shard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShard {
    pub user_id: String,
    pub thread_id: String,
    pub slide_id: String,
    pub glyph_echo: String,
    pub drift_score: f64,
    pub seal: String,
    pub content: String,
}

impl NewShard {
    pub fn into_item(self, ts: i64, request_id: String) -> MemoryItem {
        MemoryItem {
            user_id: self.user_id,
            thread_id: self.thread_id,
            slide_id: self.slide_id,
            glyph_echo: self.glyph_echo,
            drift_score: self.drift_score,
            seal: self.seal,
            content: self.content,
            ts,
            request_id,
        }
    }
}

/// Exact-match filter over the indexed shard fields. `None` matches anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShardFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seal: Option<String>,
}

impl ShardFilter {
    pub fn matches(&self, item: &MemoryItem) -> bool {
        fn field_ok(want: &Option<String>, have: &str) -> bool {
            want.as_deref().is_none_or(|w| w == have)
        }
        field_ok(&self.user_id, &item.user_id)
            && field_ok(&self.thread_id, &item.thread_id)
            && field_ok(&self.slide_id, &item.slide_id)
            && field_ok(&self.seal, &item.seal)
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.thread_id.is_none()
            && self.slide_id.is_none()
            && self.seal.is_none()
    }
}

// =====================================================
// RPC Request Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct PrivacyFilterRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReflectionIdRequest {
    pub email: String,
}

// =====================================================
// RPC Response Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MemoryList {
    pub items: Vec<MemoryItem>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PrivacyFilterResult {
    pub text: String,
    pub emails_masked: usize,
    pub phones_masked: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReflectionId {
    pub seal: String,
}

// =====================================================
// Service Status
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub ok: bool,
    pub ts: i64,
    pub version: String,
    pub uptime_secs: u64,
    pub shard_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(user: &str, thread: &str, seal: &str) -> MemoryItem {
        MemoryItem {
            user_id: user.to_string(),
            thread_id: thread.to_string(),
            slide_id: "s1".to_string(),
            glyph_echo: "echo".to_string(),
            drift_score: 0.5,
            seal: seal.to_string(),
            content: "hello".to_string(),
            ts: 1_700_000_000,
            request_id: "r1".to_string(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = ShardFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&item("u1", "t1", "GLYPH-a")));
    }

    #[test]
    fn test_filter_fields_combine() {
        let filter = ShardFilter {
            user_id: Some("u1".to_string()),
            seal: Some("GLYPH-a".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&item("u1", "t9", "GLYPH-a")));
        assert!(!filter.matches(&item("u1", "t9", "GLYPH-b")));
        assert!(!filter.matches(&item("u2", "t9", "GLYPH-a")));
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let filter = ShardFilter {
            user_id: Some("U1".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&item("u1", "t1", "GLYPH-a")));
    }

    #[test]
    fn test_error_response_omits_data() {
        let resp: ApiResponse<MemoryItem> = ApiResponse::err("Unauthorized");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"], "Unauthorized");
        assert!(json.get("data").is_none());
    }
}
