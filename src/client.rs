//! The client module sends batches of URLs to the configured AI provider and
//! normalizes its answer into [`SlugResult`]s.

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;

use crate::adapter::{RequestTarget, adapter_for};
use crate::error::{Result, SlugError};
use crate::http;
use crate::normalize::map_results;
use crate::prompt::build_prompt;
use crate::provider::{Provider, ProviderConfig};
use crate::slug::SlugResult;

/// Anything that can propose slugs for one batch of URLs.
#[async_trait]
pub trait SlugOptimizer: Send + Sync {
    /// Proposes a slug for every URL in `urls`.
    ///
    /// The returned results follow the order of `urls` and carry the ids
    /// `id_base`, `id_base + 1`, and so on.
    async fn optimize_batch(
        &self,
        urls: &[String],
        geo_target: &str,
        id_base: i64,
    ) -> Result<Vec<SlugResult>>;
}

/// HTTP client for the slug-proposing AI providers.
pub struct SlugClient {
    http: reqwest::Client,
    config: ProviderConfig,
    base_url: Option<String>,
    relay: Option<String>,
    prompt_template: Option<String>,
}

impl SlugClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            http: http::client(),
            config,
            base_url: None,
            relay: None,
            prompt_template: None,
        }
    }

    /// Sends requests to `base_url` instead of the provider's public API origin.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Routes messages-API calls through a CORS relay prefix.
    pub fn with_relay(mut self, relay: impl Into<String>) -> Self {
        self.relay = Some(relay.into());
        self
    }

    /// Replaces the default prompt; `{geo_target}` and `{urls}` are substituted.
    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = Some(template.into());
        self
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Proposes slugs for `urls`, numbering the results from the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The provider cannot be reached ([`SlugError::Network`])
    /// * The provider rejects the credential ([`SlugError::InvalidCredential`])
    /// * The provider answers with any other failure status ([`SlugError::Provider`])
    /// * The answer holds no JSON array ([`SlugError::MalformedResponse`])
    pub async fn optimize(&self, urls: &[String], geo_target: &str) -> Result<Vec<SlugResult>> {
        self.optimize_batch(urls, geo_target, chrono::Utc::now().timestamp_millis())
            .await
    }
}

#[async_trait]
impl SlugOptimizer for SlugClient {
    async fn optimize_batch(
        &self,
        urls: &[String],
        geo_target: &str,
        id_base: i64,
    ) -> Result<Vec<SlugResult>> {
        let provider = self.config.provider();
        let adapter = adapter_for(provider);
        let target = RequestTarget {
            config: &self.config,
            base_url: self
                .base_url
                .as_deref()
                .unwrap_or(provider.default_base_url()),
            relay: self.relay.as_deref(),
        };
        let prompt = build_prompt(self.prompt_template.as_deref(), geo_target, urls);

        debug!(
            "Asking {provider} ({}) for {} slugs",
            self.config.model(),
            urls.len()
        );

        let response = adapter
            .build_request(&self.http, &target, &prompt)
            .send()
            .await
            .map_err(|source| SlugError::Network {
                url: target.base_url.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| SlugError::Network {
            url: target.base_url.to_string(),
            source,
        })?;

        if !status.is_success() {
            warn!("{provider} answered {status}: {body}");
            return Err(provider_error(provider, status.as_u16(), &body));
        }

        let body: Value = serde_json::from_str(&body)
            .map_err(|err| SlugError::MalformedResponse(err.to_string()))?;
        let items = adapter.parse_response(&body)?;

        Ok(map_results(&items, urls, id_base))
    }
}

/// Classifies a failed provider response.
///
/// Authentication failures, by status or by provider-reported code, become
/// [`SlugError::InvalidCredential`]; everything else keeps the provider's own
/// message when it sent one.
pub(crate) fn provider_error(provider: Provider, status: u16, body: &str) -> SlugError {
    let body: Option<Value> = serde_json::from_str(body).ok();
    let error = body.as_ref().and_then(|body| body.get("error"));

    if matches!(status, 401 | 403) || error.is_some_and(is_auth_error) {
        return SlugError::InvalidCredential(provider);
    }

    let message = error
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map_or_else(|| format!("HTTP error! status: {status}"), str::to_string);

    SlugError::Provider {
        provider,
        status,
        message,
    }
}

fn is_auth_error(error: &Value) -> bool {
    let field = |name: &str| error.get(name).and_then(Value::as_str);

    matches!(
        field("type"),
        Some("authentication_error" | "permission_error")
    ) || field("code") == Some("invalid_api_key")
        || matches!(field("status"), Some("UNAUTHENTICATED" | "PERMISSION_DENIED"))
        || error
            .get("details")
            .and_then(Value::as_array)
            .is_some_and(|details| {
                details
                    .iter()
                    .any(|detail| detail.get("reason").and_then(Value::as_str) == Some("API_KEY_INVALID"))
            })
}
