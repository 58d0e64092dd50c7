// Gemini API client for content generation and context caching
// Author: kelexine (https://github.com/kelexine)

use super::cache_models::{
    CachedContent, CreateCachedContentRequest, ListCachedContentsResponse,
    UpdateCachedContentRequest,
};
use super::{CachedContentApi, GeneratedText, GenerationOptions};
use crate::config::{GeminiConfig, API_KEY_ENV};
use crate::error::{AppError, RemoteServiceError, Result};
use crate::metrics;
use crate::models::gemini::{Content, GenerateContentRequest, GenerateContentResponse};
use crate::utils::duration::format_ttl;
use crate::utils::logging::{mask_secret, sanitize};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use zeroize::Zeroizing;

const CACHED_CONTENTS: &str = "cachedContents";

/// Client for the Google Gemini Generative Language API.
///
/// Holds only connection settings: base URL, API key, default model and
/// timeout. Cloning is cheap and shares the underlying connection pool.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    base_url: String,
    api_key: Arc<Zeroizing<String>>,
    default_model: String,
    timeout: Duration,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &mask_secret(&self.api_key))
            .field("default_model", &self.default_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// Fails with `MissingCredential` when the configured API key is empty.
    /// No network call is made here.
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(AppError::MissingCredential(format!(
                "{} is not set. Add it to your environment or to a .env file",
                API_KEY_ENV
            )));
        }

        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .use_rustls_tls()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Created HTTP client for {}", config.api_base_url);

        Ok(Self {
            http_client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: Arc::new(Zeroizing::new(api_key.to_string())),
            default_model: config.default_model.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        })
    }

    /// A copy of this client whose calls time out after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Relay a raw `generateContent` body to the default model.
    ///
    /// Upstream status and body come back unchanged, error statuses included.
    /// Only transport failures and timeouts are returned as errors.
    pub async fn forward_generate(&self, body: &serde_json::Value) -> Result<(u16, String)> {
        let url = self.generate_url(&self.default_model);
        let start = Instant::now();

        let response = self
            .authorized(self.http_client.post(&url))
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_failure("forward_generate", start, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_failure("forward_generate", start, e))?;

        metrics::record_remote_call(
            "forward_generate",
            status.as_str(),
            start.elapsed().as_secs_f64(),
        );

        if !status.is_success() {
            warn!("Upstream returned HTTP {} for proxied request", status);
        }

        Ok((status.as_u16(), text))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("x-goog-api-key", self.api_key.as_str())
            .timeout(self.timeout)
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, operation: &'static str, request: RequestBuilder) -> Result<String> {
        let start = Instant::now();

        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| self.transport_failure(operation, start, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_failure(operation, start, e))?;

        let elapsed = start.elapsed();
        metrics::record_remote_call(operation, status.as_str(), elapsed.as_secs_f64());

        if !status.is_success() {
            let message = extract_error_message(&body).unwrap_or_else(|| body.clone());
            error!(
                "{} failed: HTTP {} - {}",
                operation,
                status,
                sanitize(&message)
            );
            return Err(RemoteServiceError::Status {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        debug!("{} succeeded in {:?}", operation, elapsed);
        Ok(body)
    }

    fn transport_failure(
        &self,
        operation: &'static str,
        start: Instant,
        e: reqwest::Error,
    ) -> AppError {
        let err = RemoteServiceError::from(e);
        let label = if err.is_timeout() { "timeout" } else { "transport" };
        metrics::record_remote_call(operation, label, start.elapsed().as_secs_f64());
        error!("{} failed: {}", operation, sanitize(&err.to_string()));
        err.into()
    }

    fn parse<T: DeserializeOwned>(operation: &str, body: &str) -> Result<T> {
        serde_json::from_str(body).map_err(|e| {
            error!("Failed to parse {} response: {}", operation, e);
            debug!(
                "Response body (first 500 chars): {}",
                body.chars().take(500).collect::<String>()
            );
            RemoteServiceError::InvalidResponse(format!("{}: {}", operation, e)).into()
        })
    }

    fn cache_url(&self, name: &str) -> Result<String> {
        Ok(format!("{}/{}", self.base_url, cache_resource_name(name)?))
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/{}:generateContent", self.base_url, model_resource_name(model))
    }

    async fn generate(
        &self,
        operation: &'static str,
        model: &str,
        request: GenerateContentRequest,
    ) -> Result<GeneratedText> {
        let url = self.generate_url(model);
        let body = self
            .execute(operation, self.http_client.post(&url).json(&request))
            .await?;

        let response: GenerateContentResponse = Self::parse(operation, &body)?;
        generated_text(response)
    }
}

#[async_trait]
impl CachedContentApi for GeminiClient {
    async fn create_cached_content(
        &self,
        content_text: &str,
        model: &str,
        ttl: Duration,
        display_name: &str,
    ) -> Result<CachedContent> {
        info!("Creating cached content using {}...", model);

        let request = CreateCachedContentRequest {
            model: model_resource_name(model),
            contents: vec![Content::user_text(content_text)],
            ttl: Some(format_ttl(ttl)),
            display_name: Some(display_name.to_string()).filter(|n| !n.is_empty()),
        };

        let url = format!("{}/{}", self.base_url, CACHED_CONTENTS);
        let body = self
            .execute(
                "create_cached_content",
                self.http_client.post(&url).json(&request),
            )
            .await?;

        let cached: CachedContent = Self::parse("create_cached_content", &body)?;
        if cached.name.is_empty() {
            return Err(RemoteServiceError::InvalidResponse(
                "created cached content has no name".to_string(),
            )
            .into());
        }

        info!(
            "Created cached content {} (expires {:?})",
            cached.name, cached.expire_time
        );
        Ok(cached)
    }

    async fn list_cached_contents(&self) -> Result<Vec<CachedContent>> {
        let url = format!("{}/{}", self.base_url, CACHED_CONTENTS);
        let body = self
            .execute("list_cached_contents", self.http_client.get(&url))
            .await?;

        let list: ListCachedContentsResponse = Self::parse("list_cached_contents", &body)?;
        if list.next_page_token.is_some() {
            warn!(
                "Listing truncated to the first {} cached contents",
                list.cached_contents.len()
            );
        }

        debug!("Listed {} cached contents", list.cached_contents.len());
        Ok(list.cached_contents)
    }

    async fn get_cached_content(&self, name: &str) -> Result<CachedContent> {
        let url = self.cache_url(name)?;
        let body = self
            .execute("get_cached_content", self.http_client.get(&url))
            .await?;
        Self::parse("get_cached_content", &body)
    }

    async fn generate_with_cached_content(
        &self,
        name: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GeneratedText> {
        let cached_content = cache_resource_name(name)?;
        info!("Generating with cached content: {}", cached_content);

        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config: Some(options.clone()),
            cached_content: Some(cached_content),
        };

        self.generate("generate_with_cached_content", &self.default_model, request)
            .await
    }

    async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GeneratedText> {
        info!("Generating content using {}...", model);

        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config: Some(options.clone()),
            cached_content: None,
        };

        self.generate("generate_content", model, request).await
    }

    async fn update_expiry(&self, name: &str, new_ttl: Duration) -> Result<CachedContent> {
        let current = self.get_cached_content(name).await?;
        info!(
            "Updating expiry time for {} (currently {:?})",
            current.name, current.expire_time
        );

        let request = UpdateCachedContentRequest {
            ttl: format_ttl(new_ttl),
        };

        let url = self.cache_url(&current.name)?;
        let body = self
            .execute(
                "update_expiry",
                self.http_client
                    .patch(&url)
                    .query(&[("updateMask", "ttl")])
                    .json(&request),
            )
            .await?;

        let updated: CachedContent = Self::parse("update_expiry", &body)?;
        info!("Updated expiry time to {:?}", updated.expire_time);
        Ok(updated)
    }

    async fn delete_cached_content(&self, name: &str) -> Result<()> {
        let url = self.cache_url(name)?;
        info!("Deleting cached content: {}", cache_resource_name(name)?);

        self.execute("delete_cached_content", self.http_client.delete(&url))
            .await?;

        info!("Deleted successfully");
        Ok(())
    }
}

/// Prefix bare model ids with `models/`; full resource names pass through.
pub(crate) fn model_resource_name(model: &str) -> String {
    if model.contains('/') {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

/// Prefix bare cache ids with `cachedContents/`.
///
/// Ids are limited to lowercase letters, digits and `-`, so nothing in a
/// name can change the path or query of the request URL.
pub(crate) fn cache_resource_name(name: &str) -> Result<String> {
    let name = name.trim();
    let id = name
        .strip_prefix(CACHED_CONTENTS)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(name);

    let valid_id = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid_id {
        return Err(AppError::InvalidRequest(format!(
            "Invalid cached content name '{}'",
            name
        )));
    }

    Ok(format!("{}/{}", CACHED_CONTENTS, id))
}

/// Extract error message from API response JSON
fn extract_error_message(response_text: &str) -> Option<String> {
    #[derive(serde::Deserialize)]
    struct ErrorResponse {
        error: Option<ErrorDetail>,
    }

    #[derive(serde::Deserialize)]
    struct ErrorDetail {
        message: Option<String>,
        status: Option<String>,
    }

    let error = serde_json::from_str::<ErrorResponse>(response_text)
        .ok()?
        .error?;
    error.message.or(error.status)
}

/// First candidate's answer text; an empty answer is an error.
fn generated_text(response: GenerateContentResponse) -> Result<GeneratedText> {
    let usage = response.usage_metadata;

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.get("blockReason"))
            .and_then(|r| r.as_str())
            .unwrap_or("no candidates returned")
            .to_string();
        return Err(RemoteServiceError::InvalidResponse(reason).into());
    };

    let text = candidate.content.as_ref().map(Content::text).unwrap_or_default();
    if text.is_empty() {
        return Err(RemoteServiceError::InvalidResponse(format!(
            "candidate contained no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        ))
        .into());
    }

    Ok(GeneratedText {
        text,
        finish_reason: candidate.finish_reason,
        usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_with_key(key: &str) -> GeminiConfig {
        GeminiConfig {
            api_key: key.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let err = GeminiClient::new(&config_with_key("  ")).unwrap_err();
        assert!(matches!(err, AppError::MissingCredential(_)));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_debug_masks_api_key() {
        let client = GeminiClient::new(&config_with_key("AIzaSyDUMMYdummy0123456789")).unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("AIza...6789"));
        assert!(!debug.contains("DUMMYdummy"));
    }

    #[test]
    fn test_with_timeout_keeps_settings() {
        let client = GeminiClient::new(&config_with_key("test-key-123456")).unwrap();
        let short = client.with_timeout(Duration::from_millis(250));
        assert_eq!(short.timeout(), Duration::from_millis(250));
        assert_eq!(short.base_url(), client.base_url());
        assert_eq!(client.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_resource_names() {
        assert_eq!(model_resource_name("gemini-2.0-flash"), "models/gemini-2.0-flash");
        assert_eq!(model_resource_name("models/gemini-2.0-flash"), "models/gemini-2.0-flash");

        assert_eq!(cache_resource_name("abc123").unwrap(), "cachedContents/abc123");
        assert_eq!(
            cache_resource_name("cachedContents/abc123").unwrap(),
            "cachedContents/abc123"
        );
        assert!(cache_resource_name("").is_err());
        assert!(cache_resource_name("cachedContents/").is_err());
        assert!(cache_resource_name("../models/x").is_err());

        // The prefix only counts with its separator
        assert!(cache_resource_name("cachedContentsX1").is_err());
        assert!(cache_resource_name("cachedContents").is_err());
        assert!(cache_resource_name("cachedContents//abc123").is_err());

        // Nothing that could alter the request URL
        assert!(cache_resource_name("abc123?updateMask=ttl").is_err());
        assert!(cache_resource_name("abc123#frag").is_err());
        assert!(cache_resource_name("abc%2F123").is_err());
        assert!(cache_resource_name("abc 123").is_err());
    }

    #[test]
    fn test_cache_url_rejects_query_injection() {
        let client = GeminiClient::new(&config_with_key("test-key-123456")).unwrap();
        assert!(client.cache_url("abc123?foo").is_err());
        assert_eq!(
            client.cache_url(" cachedContents/abc-123 ").unwrap(),
            format!("{}/cachedContents/abc-123", client.base_url())
        );
    }

    #[test]
    fn test_extract_error_message() {
        let body = r#"{"error": {"code": 404, "message": "CachedContent not found", "status": "NOT_FOUND"}}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("CachedContent not found")
        );
        assert_eq!(extract_error_message("not json"), None);
    }

    #[test]
    fn test_generated_text_rejects_empty_candidates() {
        let blocked: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        let err = generated_text(blocked).unwrap_err();
        assert!(err.is_remote());
        assert!(err.to_string().contains("SAFETY"));

        let empty: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"role": "model", "parts": []}, "finishReason": "MAX_TOKENS"}]
        }))
        .unwrap();
        assert!(generated_text(empty).unwrap_err().to_string().contains("MAX_TOKENS"));
    }
}
