// Gemini cached content models for the cachedContents API
// Author: kelexine (https://github.com/kelexine)

use crate::models::gemini::Content;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to create a cached content entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCachedContentRequest {
    pub model: String, // e.g., "models/gemini-2.0-flash"
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>, // e.g., "86400s" for 24 hours
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Partial update body; only the fields named in `updateMask` are applied.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateCachedContentRequest {
    pub ttl: String,
}

/// A cached content resource as reported by the service.
///
/// The service owns this resource. A value of this type is a snapshot taken
/// at the time of the call that returned it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedContent {
    pub name: String, // e.g., "cachedContents/abc123"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<CachedContentUsage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<Content>,
}

impl CachedContent {
    /// Time left before the service expires this resource, as of `now`.
    ///
    /// `None` when the service did not report an expiry.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.expire_time.map(|expire| expire - now)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expire_time, Some(expire) if expire <= now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedContentUsage {
    #[serde(default)]
    pub total_token_count: u32,
}

/// Response from listing cached contents
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCachedContentsResponse {
    #[serde(default)]
    pub cached_contents: Vec<CachedContent>,
    pub next_page_token: Option<String>,
}
