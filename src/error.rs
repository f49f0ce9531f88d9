//! Error types shared by the crawler, the provider client and the validator.

use thiserror::Error;

use crate::provider::Provider;

/// Result type for crawl and optimization operations.
pub type Result<T> = std::result::Result<T, SlugError>;

/// Everything that can stop a crawl or an optimization batch.
#[derive(Debug, Error)]
pub enum SlugError {
    /// A sitemap document answered with a non-success HTTP status.
    #[error("Failed to fetch sitemap: HTTP {status} from {url}")]
    Fetch { url: String, status: u16 },

    /// The target could not be reached at all (DNS, connection, TLS, aborted body).
    #[error("Could not reach {url}. Please ensure the URL is correct and publicly accessible.")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A sitemap document is not well-formed XML.
    #[error("Error parsing XML from {url}: {reason}. Make sure it is a valid XML sitemap.")]
    Parse { url: String, reason: String },

    /// An AI provider answered with a non-success HTTP status.
    #[error("{provider} request failed: {message}")]
    Provider {
        provider: Provider,
        status: u16,
        message: String,
    },

    /// The provider answered, but not with a usable JSON array.
    #[error("AI response was not a valid JSON array: {0}")]
    MalformedResponse(String),

    #[error("Authentication failed. Please check your {0} API key.")]
    InvalidCredential(Provider),

    /// A slug holds a tab or line break.
    #[error("Slug {0:?} must not contain tabs or line breaks")]
    InvalidSlug(String),

    #[error("Unsupported AI provider: {0}")]
    UnsupportedProvider(String),

    #[error("Model '{model}' is not available for {provider}")]
    UnsupportedModel { provider: Provider, model: String },
}
