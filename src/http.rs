use log::warn;
use url::form_urlencoded;

use crate::constants::USER_AGENT;

/// Builds the HTTP client shared by sitemap fetches, provider calls and probes.
///
/// Falls back to reqwest's default client, without the bot user agent, if the
/// configured one cannot be built.
pub(crate) fn client() -> reqwest::Client {
    match reqwest::Client::builder().user_agent(USER_AGENT).build() {
        Ok(client) => client,
        Err(err) => {
            warn!("Failed to build HTTP client with user agent '{USER_AGENT}', using defaults: {err}");
            reqwest::Client::default()
        }
    }
}

/// Routes `target` through a CORS relay when one is configured.
///
/// The relay prefix gets the percent-encoded target appended, e.g.
/// `https://corsproxy.io/?` + `https%3A%2F%2Fexample.com%2Fsitemap.xml`.
pub(crate) fn route(relay: Option<&str>, target: &str) -> String {
    match relay {
        Some(prefix) => format!(
            "{prefix}{}",
            form_urlencoded::byte_serialize(target.as_bytes()).collect::<String>()
        ),
        None => target.to_string(),
    }
}
