//! Per-provider request shapes and response locations.
//!
//! Every provider gets the same prompt. What differs is how the request is
//! authenticated and constrained, and where the JSON answer sits in the reply.

use reqwest::RequestBuilder;
use serde_json::{Value, json};

use crate::constants::{
    ANTHROPIC_VERSION, CHAT_SYSTEM_INSTRUCTION, CLAUDE_MAX_TOKENS, GATEWAY_REFERER,
    GATEWAY_TITLE, MESSAGES_SYSTEM_INSTRUCTION, SCHEMA_INSTRUCTION,
};
use crate::error::{Result, SlugError};
use crate::http;
use crate::normalize::{expect_array, find_array, parse_model_text};
use crate::provider::{Provider, ProviderConfig};

/// Where and with which credentials a request is sent.
pub(crate) struct RequestTarget<'a> {
    pub config: &'a ProviderConfig,
    pub base_url: &'a str,
    pub relay: Option<&'a str>,
}

pub(crate) trait ProviderAdapter: Send + Sync {
    fn build_request(
        &self,
        client: &reqwest::Client,
        target: &RequestTarget<'_>,
        prompt: &str,
    ) -> RequestBuilder;

    /// Extracts the slug array from a successful response body.
    fn parse_response(&self, body: &Value) -> Result<Vec<Value>>;
}

pub(crate) fn adapter_for(provider: Provider) -> Box<dyn ProviderAdapter> {
    match provider {
        Provider::Gemini => Box::new(SchemaAdapter),
        Provider::OpenAi => Box::new(ChatCompletionAdapter { gateway: false }),
        Provider::OpenRouter => Box::new(ChatCompletionAdapter { gateway: true }),
        Provider::Claude => Box::new(MessagesAdapter),
    }
}

/// Generation call with an enforced response schema; the answer is the array itself.
pub(crate) struct SchemaAdapter;

impl ProviderAdapter for SchemaAdapter {
    fn build_request(
        &self,
        client: &reqwest::Client,
        target: &RequestTarget<'_>,
        prompt: &str,
    ) -> RequestBuilder {
        client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                target.base_url,
                target.config.model()
            ))
            .header("x-goog-api-key", target.config.api_key())
            .json(&json!({
                "contents": [{ "parts": [{ "text": format!("{prompt}{SCHEMA_INSTRUCTION}") }] }],
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "originalUrl": { "type": "STRING" },
                                "proposedSlug": { "type": "STRING" }
                            },
                            "required": ["originalUrl", "proposedSlug"]
                        }
                    }
                }
            }))
    }

    fn parse_response(&self, body: &Value) -> Result<Vec<Value>> {
        let text = text_at(body, "/candidates/0/content/parts/0/text")?;
        expect_array(parse_model_text(text)?)
    }
}

/// OpenAI-compatible chat completion, optionally through the OpenRouter gateway.
pub(crate) struct ChatCompletionAdapter {
    pub gateway: bool,
}

impl ProviderAdapter for ChatCompletionAdapter {
    fn build_request(
        &self,
        client: &reqwest::Client,
        target: &RequestTarget<'_>,
        prompt: &str,
    ) -> RequestBuilder {
        let request = client
            .post(format!("{}/v1/chat/completions", target.base_url))
            .bearer_auth(target.config.api_key())
            .json(&json!({
                "model": target.config.model(),
                "messages": [
                    { "role": "system", "content": CHAT_SYSTEM_INSTRUCTION },
                    { "role": "user", "content": prompt }
                ],
                "response_format": { "type": "json_object" }
            }));

        if self.gateway {
            request
                .header("HTTP-Referer", GATEWAY_REFERER)
                .header("X-Title", GATEWAY_TITLE)
        } else {
            request
        }
    }

    // json_object mode forces an object, so the array usually comes wrapped.
    fn parse_response(&self, body: &Value) -> Result<Vec<Value>> {
        let content = text_at(body, "/choices/0/message/content")?;
        find_array(parse_model_text(content)?)
    }
}

/// Messages API call, routed through the CORS relay when one is configured.
pub(crate) struct MessagesAdapter;

impl ProviderAdapter for MessagesAdapter {
    fn build_request(
        &self,
        client: &reqwest::Client,
        target: &RequestTarget<'_>,
        prompt: &str,
    ) -> RequestBuilder {
        let endpoint = format!("{}/v1/messages", target.base_url);
        client
            .post(http::route(target.relay, &endpoint))
            .header("x-api-key", target.config.api_key())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": target.config.model(),
                "max_tokens": CLAUDE_MAX_TOKENS,
                "system": MESSAGES_SYSTEM_INSTRUCTION,
                "messages": [{ "role": "user", "content": prompt }]
            }))
    }

    fn parse_response(&self, body: &Value) -> Result<Vec<Value>> {
        let text = text_at(body, "/content/0/text")?;
        expect_array(parse_model_text(text)?)
    }
}

fn text_at<'a>(body: &'a Value, pointer: &str) -> Result<&'a str> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| SlugError::MalformedResponse(format!("response has no text at {pointer}")))
}
