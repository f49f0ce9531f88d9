//! Cheap probes that tell whether an API key is accepted by its provider.

use log::{debug, warn};
use serde_json::json;

use crate::constants::{ANTHROPIC_VERSION, CLAUDE_PROBE_MODEL};
use crate::http;
use crate::provider::Provider;

/// Checks `api_key` against the public endpoint of `provider`.
///
/// See [`KeyProbe::validate`].
pub async fn validate_api_key(provider: Provider, api_key: &str) -> bool {
    KeyProbe::new(provider).validate(api_key).await
}

/// Sends the smallest request a provider will authenticate.
pub struct KeyProbe {
    http: reqwest::Client,
    provider: Provider,
    base_url: Option<String>,
    relay: Option<String>,
}

impl KeyProbe {
    pub fn new(provider: Provider) -> Self {
        Self {
            http: http::client(),
            provider,
            base_url: None,
            relay: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Routes the messages-API probe through a CORS relay prefix.
    pub fn with_relay(mut self, relay: impl Into<String>) -> Self {
        self.relay = Some(relay.into());
        self
    }

    /// Returns whether the provider accepts `api_key`.
    ///
    /// * Gemini keys are supplied by the environment and always count as valid.
    /// * An empty key is invalid and sends nothing.
    /// * OpenAI and OpenRouter list their models; success means valid.
    /// * Claude gets a one-token message; success or `400 Bad Request` means the
    ///   key passed authentication.
    ///
    /// Network failures make the key count as invalid.
    pub async fn validate(&self, api_key: &str) -> bool {
        if self.provider == Provider::Gemini {
            return true;
        }
        if api_key.is_empty() {
            return false;
        }

        let base_url = self
            .base_url
            .as_deref()
            .unwrap_or(self.provider.default_base_url());

        let request = match self.provider {
            Provider::Claude => self
                .http
                .post(http::route(self.relay.as_deref(), &format!("{base_url}/v1/messages")))
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&json!({
                    "model": CLAUDE_PROBE_MODEL,
                    "max_tokens": 1,
                    "messages": [{ "role": "user", "content": "test" }]
                })),
            _ => self
                .http
                .get(format!("{base_url}/v1/models"))
                .bearer_auth(api_key),
        };

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                debug!("{} key probe answered {status}", self.provider);
                status.is_success()
                    || (self.provider == Provider::Claude && status == reqwest::StatusCode::BAD_REQUEST)
            }
            Err(err) => {
                warn!("{} validation error: {err}", self.provider);
                false
            }
        }
    }
}
