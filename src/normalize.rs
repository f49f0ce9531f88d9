//! Turns provider answers into one [`SlugResult`] per requested URL.

use std::collections::HashMap;

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::constants::{CODE_FENCE, THINK_STRIPPER};
use crate::error::{Result, SlugError};
use crate::slug::SlugResult;

static THINK_STRIPPER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(THINK_STRIPPER).expect("Failed to compile THINK_STRIPPER regex"));

static CODE_FENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(CODE_FENCE).expect("Failed to compile CODE_FENCE regex"));

/// Parses the text a model produced into JSON.
///
/// Reasoning blocks and a surrounding Markdown code fence are dropped first.
pub(crate) fn parse_model_text(text: &str) -> Result<Value> {
    let text = THINK_STRIPPER_REGEX.replace_all(text, "");
    let text = text.trim();
    let text = CODE_FENCE_REGEX
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map_or(text, |inner| inner.as_str());

    serde_json::from_str(text).map_err(|err| SlugError::MalformedResponse(err.to_string()))
}

/// Requires `value` to be a JSON array.
pub(crate) fn expect_array(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(SlugError::MalformedResponse(format!(
            "expected an array, got {}",
            kind(&other)
        ))),
    }
}

/// Accepts a JSON array, or an object wrapping one such as `{"results": [...]}`,
/// in which case the first array-typed value is used.
pub(crate) fn find_array(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Object(map) => {
            let wrapped = map.into_iter().find_map(|(key, value)| match value {
                Value::Array(items) => Some((key, items)),
                _ => None,
            });
            match wrapped {
                Some((key, items)) => {
                    warn!("AI response wrapped the slug array in an object, using key '{key}'");
                    Ok(items)
                }
                None => Err(SlugError::MalformedResponse(
                    "object response holds no array".to_string(),
                )),
            }
        }
        other => expect_array(other),
    }
}

/// Maps a provider's answer onto `urls`.
///
/// Every URL yields exactly one result, in input order. Entries without a
/// non-empty `originalUrl` and `proposedSlug` are ignored, and URLs the
/// provider skipped keep their current slug. Ids count up from `id_base`.
pub fn map_results(items: &[Value], urls: &[String], id_base: i64) -> Vec<SlugResult> {
    let proposals: HashMap<&str, &str> = items
        .iter()
        .filter_map(|item| {
            let original_url = item.get("originalUrl")?.as_str()?;
            let proposed_slug = item.get("proposedSlug")?.as_str()?;
            (!original_url.is_empty() && !proposed_slug.is_empty())
                .then_some((original_url, proposed_slug))
        })
        .collect();

    urls.iter()
        .zip(id_base..)
        .map(|(url, id)| SlugResult::new(id, url.as_str(), proposals.get(url.as_str()).copied()))
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
