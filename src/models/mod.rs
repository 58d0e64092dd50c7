//! Wire types for the Gemini Generative Language API.
//!
//! Cached-content resource types live next to the client in
//! `gemini::cache_models`; this module holds the shared content and
//! generation payloads.

// Author: kelexine (https://github.com/kelexine)

pub mod gemini;

pub use gemini::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
    UsageMetadata,
};
