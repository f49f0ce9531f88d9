use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::constants::DEFAULT_PROMPT_TEMPLATE;

static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{(geo_target|urls)\}").expect("Failed to compile placeholder regex")
});

/// Renders the slug prompt for one batch.
///
/// `{geo_target}` and `{urls}` are replaced in the template in a single pass,
/// so placeholder text inside the geo-target stays literal. A custom template
/// without `{urls}` gets the URL list appended, so the model always sees the
/// exact URLs it has to echo back.
pub fn build_prompt(template: Option<&str>, geo_target: &str, urls: &[String]) -> String {
    let template = template.unwrap_or(DEFAULT_PROMPT_TEMPLATE);
    let url_list = urls.join(", ");

    let prompt = PLACEHOLDER_REGEX.replace_all(template, |captures: &Captures<'_>| {
        match captures.get(1).map(|name| name.as_str()) {
            Some("urls") => url_list.clone(),
            _ => geo_target.to_string(),
        }
    });

    if template.contains("{urls}") {
        prompt.into_owned()
    } else {
        format!("{prompt}\nThe original URLs are: {url_list}.")
    }
}
