//! Utility functions and helpers for gemcache.
//!
//! # Submodules
//!
//! - `logging`: Tracing initialization and API key masking.
//! - `duration`: TTL strings in the API's `"<seconds>s"` form.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod duration;
pub mod logging;
