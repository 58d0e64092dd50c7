// Gemini API client module
// Author: kelexine (https://github.com/kelexine)

pub mod cache_models;
mod client;

pub use cache_models::{CachedContent, CachedContentUsage};
pub use client::GeminiClient;

use crate::error::Result;
use crate::models::gemini::{GenerationConfig, UsageMetadata};
use async_trait::async_trait;
use std::time::Duration;

/// Sampling options passed through unmodified as `generationConfig`.
pub type GenerationOptions = GenerationConfig;

/// Options used by the caching demo and the interactive commands.
pub fn default_generation_options() -> GenerationOptions {
    GenerationOptions {
        temperature: Some(0.7),
        top_p: Some(0.95),
        top_k: Some(40),
        max_output_tokens: Some(1024),
    }
}

/// Text produced by one `generateContent` call.
#[derive(Debug, Clone)]
pub struct GeneratedText {
    pub text: String,
    pub finish_reason: Option<String>,
    pub usage: Option<UsageMetadata>,
}

/// Operations against the remote cached-content resource and the
/// generation endpoint.
///
/// Each method is one remote call (two for `update_expiry`). Nothing is
/// retried and no state is kept between calls; the resource name returned
/// by one call is what links it to the next.
#[async_trait]
pub trait CachedContentApi: Send + Sync {
    /// Cache `content_text` as a single user turn for `model`.
    async fn create_cached_content(
        &self,
        content_text: &str,
        model: &str,
        ttl: Duration,
        display_name: &str,
    ) -> Result<CachedContent>;

    /// First page of cached contents visible to the API key.
    async fn list_cached_contents(&self) -> Result<Vec<CachedContent>>;

    async fn get_cached_content(&self, name: &str) -> Result<CachedContent>;

    /// Generate with the cached content `name` prepended to `prompt`.
    async fn generate_with_cached_content(
        &self,
        name: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GeneratedText>;

    /// Plain generation without any cached context.
    async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GeneratedText>;

    /// Replace the TTL of `name`, counted from the time of the call.
    async fn update_expiry(&self, name: &str, new_ttl: Duration) -> Result<CachedContent>;

    async fn delete_cached_content(&self, name: &str) -> Result<()>;
}
