use serde::Serialize;
use url::Url;

use crate::constants::INVALID_SLUG;
use crate::error::{Result, SlugError};

/// One page of the sitemap with its current and proposed slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlugResult {
    id: i64,
    original_url: String,
    current_slug: String,
    proposed_slug: String,
}

impl SlugResult {
    /// Creates a result for `original_url`, deriving the current slug from its path.
    ///
    /// A missing or empty proposal, or one with a tab or line break, falls back
    /// to the current slug.
    pub fn new(id: i64, original_url: impl Into<String>, proposed_slug: Option<&str>) -> Self {
        let original_url = original_url.into();
        let current_slug = get_slug(&original_url);
        let proposed_slug = proposed_slug
            .filter(|slug| !slug.is_empty() && check_slug(slug).is_ok())
            .map_or_else(|| current_slug.clone(), str::to_string);

        Self {
            id,
            original_url,
            current_slug,
            proposed_slug,
        }
    }

    /// Restores a stored result as is.
    pub(crate) fn from_parts(
        id: i64,
        original_url: String,
        current_slug: String,
        proposed_slug: String,
    ) -> Self {
        Self {
            id,
            original_url,
            current_slug,
            proposed_slug,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    pub fn current_slug(&self) -> &str {
        &self.current_slug
    }

    pub fn proposed_slug(&self) -> &str {
        &self.proposed_slug
    }

    /// Replaces the proposed slug.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::InvalidSlug`] if `slug` contains a tab or line break.
    pub fn set_proposed_slug(&mut self, slug: impl Into<String>) -> Result<()> {
        let slug = slug.into();
        check_slug(&slug)?;
        self.proposed_slug = slug;
        Ok(())
    }
}

/// Rejects slugs with tabs or line breaks, which would split report rows.
///
/// # Errors
///
/// Returns [`SlugError::InvalidSlug`] naming the offending slug.
pub fn check_slug(slug: &str) -> Result<()> {
    if slug.contains(['\t', '\n', '\r']) {
        return Err(SlugError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

/// Derives a slug from the path of `url`: one leading and one trailing slash
/// are removed, so `https://x.com/a/b/` gives `a/b`.
///
/// Unparsable input gives [`INVALID_SLUG`].
pub fn get_slug(url: &str) -> String {
    let Ok(url) = Url::parse(url) else {
        return INVALID_SLUG.to_string();
    };

    let path = url.path();
    let path = path.strip_prefix('/').unwrap_or(path);
    path.strip_suffix('/').unwrap_or(path).to_string()
}
