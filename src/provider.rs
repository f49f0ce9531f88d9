//! AI provider selection and per-provider configuration.

use std::fmt;

use crate::constants::{
    CLAUDE_BASE_URL, CLAUDE_MODELS, GEMINI_BASE_URL, GEMINI_MODELS, OPENAI_BASE_URL,
    OPENAI_MODELS, OPENROUTER_BASE_URL,
};
use crate::error::{Result, SlugError};

/// Enum representing the AI provider that proposes slugs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Provider {
    /// Google Gemini, answers through an enforced response schema
    #[default]
    Gemini,
    /// OpenAI chat completions
    OpenAi,
    /// Anthropic Claude messages API
    Claude,
    /// OpenRouter gateway, OpenAI-compatible chat completions with any model
    OpenRouter,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::Gemini,
        Provider::OpenAi,
        Provider::Claude,
        Provider::OpenRouter,
    ];

    /// Identifier accepted on the command line.
    pub fn id(self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAi => "openai",
            Provider::Claude => "claude",
            Provider::OpenRouter => "openrouter",
        }
    }

    /// Allowed models. Empty means any model name is accepted.
    pub fn models(self) -> &'static [&'static str] {
        match self {
            Provider::Gemini => GEMINI_MODELS,
            Provider::OpenAi => OPENAI_MODELS,
            Provider::Claude => CLAUDE_MODELS,
            Provider::OpenRouter => &[],
        }
    }

    pub fn default_model(self) -> Option<&'static str> {
        self.models().first().copied()
    }

    pub(crate) fn default_base_url(self) -> &'static str {
        match self {
            Provider::Gemini => GEMINI_BASE_URL,
            Provider::OpenAi => OPENAI_BASE_URL,
            Provider::Claude => CLAUDE_BASE_URL,
            Provider::OpenRouter => OPENROUTER_BASE_URL,
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = SlugError;

    fn from_str(input: &str) -> Result<Self> {
        Provider::ALL
            .into_iter()
            .find(|provider| provider.id() == input.to_lowercase())
            .ok_or_else(|| SlugError::UnsupportedProvider(input.to_string()))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Gemini => "Gemini",
            Provider::OpenAi => "OpenAI",
            Provider::Claude => "Claude",
            Provider::OpenRouter => "OpenRouter",
        };
        formatter.write_str(name)
    }
}

/// Provider, credential and model used for one optimization run.
#[derive(Clone)]
pub struct ProviderConfig {
    provider: Provider,
    api_key: String,
    model: String,
}

impl ProviderConfig {
    /// Creates a configuration, falling back to the provider's first model when
    /// `model` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::UnsupportedModel`] if the model is not in the
    /// provider's allow-list, or if no model is given for a provider without one.
    pub fn new(provider: Provider, api_key: impl Into<String>, model: Option<String>) -> Result<Self> {
        let model = match model {
            Some(model) => model.trim().to_string(),
            None => provider.default_model().unwrap_or_default().to_string(),
        };

        let allowed = provider.models();
        let accepted = if allowed.is_empty() {
            !model.is_empty()
        } else {
            allowed.contains(&model.as_str())
        };
        if !accepted {
            return Err(SlugError::UnsupportedModel { provider, model });
        }

        Ok(Self {
            provider,
            api_key: api_key.into(),
            model,
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_ids_and_rejects_others() {
        assert_eq!("OpenRouter".parse::<Provider>().ok(), Some(Provider::OpenRouter));
        assert!(matches!(
            "mistral".parse::<Provider>(),
            Err(SlugError::UnsupportedProvider(id)) if id == "mistral"
        ));
    }

    #[test]
    fn model_defaults_and_allow_list() {
        let config = ProviderConfig::new(Provider::Claude, "k", None).expect("default model");
        assert_eq!(config.model(), "claude-3-opus-20240229");

        assert!(ProviderConfig::new(Provider::OpenAi, "k", Some("gpt-5".into())).is_err());
        assert!(ProviderConfig::new(Provider::OpenRouter, "k", None).is_err());
        assert!(
            ProviderConfig::new(Provider::OpenRouter, "k", Some("mistralai/mistral-7b-instruct".into()))
                .is_ok()
        );
    }

    #[test]
    fn debug_hides_the_key() {
        let config = ProviderConfig::new(Provider::Gemini, "secret-key", None).expect("config");
        assert!(!format!("{config:?}").contains("secret-key"));
    }
}
