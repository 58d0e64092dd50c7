//! Axum-based local proxy for the Gemini generation endpoint.
//!
//! Browser front-ends post `generateContent` bodies to `/api/gemini` and the
//! proxy adds the API key, relays the call and memoizes successful answers.
//!
//! # Components
//!
//! - `handlers`: Proxy, cache statistics, cache clearing, health and metrics.
//! - `middleware`: Request ID and CORS layers.
//! - `routes`: The router that ties everything together.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod handlers;
mod middleware;
mod routes;

pub use handlers::HealthResponse;
pub use routes::{create_router, AppState};
