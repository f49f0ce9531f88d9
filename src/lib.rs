//! The slugmap library crawls a website's sitemap.xml and asks an AI provider
//! to propose SEO-friendly, geo-targeted slugs for every page it lists.

mod adapter;
pub mod client;
pub mod constants;
pub mod error;
mod http;
pub mod normalize;
pub mod optimize;
pub mod prompt;
pub mod provider;
pub mod report;
pub mod sitemap;
pub mod slug;
pub mod storage;
pub mod validate;

/// Enum representing the file format of a results report.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ReportFormat {
    /// Pretty-printed JSON array
    #[default]
    Json,
    /// Tab-separated values with a header row
    Tsv,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "tsv" => Ok(ReportFormat::Tsv),
            _ => Err(format!("Invalid report format: {}", input)),
        }
    }
}

pub use client::{SlugClient, SlugOptimizer};
pub use error::SlugError;
pub use normalize::map_results;
pub use optimize::{OptimizeContext, OptimizeJob, OptimizeReport, optimize_sitemap, optimize_urls};
pub use provider::{Provider, ProviderConfig};
pub use report::report;
pub use sitemap::SitemapCrawler;
pub use slug::{SlugResult, check_slug, get_slug};
pub use validate::{KeyProbe, validate_api_key};
