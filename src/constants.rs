pub const MODEL_API_KEY_ENV_NAME: &str = "SLUGMAP_API_KEY";

pub const USER_AGENT: &str = "Slugmap Bot";

/// Relay used when `--relay` is passed without a value.
pub const DEFAULT_RELAY: &str = "https://corsproxy.io/?";

pub const URL_BATCH_SIZE: usize = 50;

pub const INVALID_SLUG: &str = "invalid-url";

pub(crate) const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub(crate) const OPENAI_BASE_URL: &str = "https://api.openai.com";
pub(crate) const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api";
pub(crate) const CLAUDE_BASE_URL: &str = "https://api.anthropic.com";

pub(crate) const ANTHROPIC_VERSION: &str = "2023-06-01";
pub(crate) const CLAUDE_MAX_TOKENS: u32 = 4096;
pub(crate) const CLAUDE_PROBE_MODEL: &str = "claude-3-haiku-20240307";

pub(crate) const GATEWAY_REFERER: &str = concat!("https://crates.io/crates/", env!("CARGO_PKG_NAME"));
pub(crate) const GATEWAY_TITLE: &str = "Slugmap";

pub(crate) const GEMINI_MODELS: &[&str] = &["gemini-2.5-flash"];
pub(crate) const OPENAI_MODELS: &[&str] = &["gpt-4o", "gpt-4-turbo", "gpt-3.5-turbo"];
pub(crate) const CLAUDE_MODELS: &[&str] = &[
    "claude-3-opus-20240229",
    "claude-3-sonnet-20240229",
    "claude-3-haiku-20240307",
];

pub(crate) const THINK_STRIPPER: &str = r"<think>[\s\S]*</think>\s*";
pub(crate) const CODE_FENCE: &str = r"^```[a-zA-Z]*\s*([\s\S]*?)\s*```$";

pub(crate) const DEFAULT_PROMPT_TEMPLATE: &str = r#"
You are an expert SEO specialist for WordPress websites.
Rewrite the URL slugs below so they are more SEO-friendly and geo-targeted.
The geo-target is: "{geo_target}".

Follow these rules:
1. Create short, descriptive, keyword-rich slugs.
2. Work the geo-target "{geo_target}" in naturally where it fits. Pages that are not location-specific (e.g. 'about-us', 'contact') must not get the geo-target.
3. Separate words with hyphens (-).
4. Use lowercase letters only.
5. Drop common stop words (e.g. 'a', 'the', 'in').
6. The new slug must be a clear SEO improvement over the old one.

The original URLs are: {urls}."#;

pub(crate) const SCHEMA_INSTRUCTION: &str = r#"
Return a JSON array of objects, where each object has two keys: "originalUrl" and "proposedSlug"."#;

pub(crate) const CHAT_SYSTEM_INSTRUCTION: &str = r#"You are an SEO expert. Respond with only a valid JSON array of objects with keys "originalUrl" and "proposedSlug"."#;

pub(crate) const MESSAGES_SYSTEM_INSTRUCTION: &str = r#"You are an SEO expert. Return a valid JSON array of objects, where each object has "originalUrl" and "proposedSlug" keys. Respond ONLY with the JSON array, without any surrounding text or markdown formatting."#;
