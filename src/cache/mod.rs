// Local response cache for the proxy
// Author: kelexine (https://github.com/kelexine)

pub mod manager;
pub mod models;

pub use manager::ResponseCache;
pub use models::{CacheStats, CachedResponse};
