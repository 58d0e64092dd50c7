//! Response cache entry and statistics models.

// Author: kelexine (https://github.com/kelexine)

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// A memoized upstream response body.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub body: String,
    /// `None` when the TTL reaches past what `Instant` can represent.
    pub expires_at: Option<Instant>,
}

impl CachedResponse {
    pub fn is_expired_at(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(expires_at) if now >= expires_at)
    }
}

/// Snapshot of the response cache, served by `/api/cache-stats`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Entries currently stored, expired ones included.
    pub total: usize,
    /// Entries that can still be served.
    pub active: usize,
    /// Entries past their TTL that have not been dropped yet.
    pub expired: usize,
}
