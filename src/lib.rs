// gemcache - Gemini context caching client and memoizing proxy
// Author: kelexine (https://github.com/kelexine)

pub mod cache;
pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod gemini;
pub mod metrics;
pub mod models;
pub mod recommend;
pub mod server;
pub mod utils;
