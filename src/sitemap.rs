//! The sitemap module resolves a sitemap (or a tree of sitemap indexes) into
//! the flat list of page URLs it describes.

use std::collections::HashSet;
use std::sync::Mutex;

use futures::future::{BoxFuture, FutureExt, try_join_all};
use log::{debug, info};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Result, SlugError};
use crate::http;

/// Crawls sitemap documents and collects the page URLs they list.
///
/// Every call to [`SitemapCrawler::crawl`] starts from empty state, so one
/// crawler can serve any number of crawls, including concurrent ones.
pub struct SitemapCrawler {
    client: reqwest::Client,
    relay: Option<String>,
}

impl Default for SitemapCrawler {
    fn default() -> Self {
        Self {
            client: http::client(),
            relay: None,
        }
    }
}

impl SitemapCrawler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches every sitemap document through a CORS relay prefix such as
    /// `https://corsproxy.io/?`.
    pub fn with_relay(mut self, relay: impl Into<String>) -> Self {
        self.relay = Some(relay.into());
        self
    }

    /// Extracts page URLs from a sitemap.
    ///
    /// Sitemap indexes are followed recursively, children of one index are
    /// fetched in parallel. Each document is fetched at most once, so cyclic
    /// indexes terminate. Page URLs are trimmed and deduplicated by exact string.
    ///
    /// # Arguments
    ///
    /// * `sitemap_url` - The URL of the root sitemap or sitemap index
    ///
    /// # Returns
    ///
    /// The discovered page URLs in first-seen order.
    ///
    /// # Errors
    ///
    /// The whole crawl is aborted, with no partial result, if any document:
    /// * cannot be reached ([`SlugError::Network`])
    /// * answers with a non-success status ([`SlugError::Fetch`])
    /// * is not well-formed XML ([`SlugError::Parse`])
    ///
    /// # Panics
    ///
    /// Panics if a crawl state mutex is poisoned
    pub async fn crawl(&self, sitemap_url: &str) -> Result<Vec<String>> {
        info!("Crawling sitemap {sitemap_url}");

        let state = CrawlState::default();
        self.visit(&state, sitemap_url.to_string()).await?;

        let urls = state.into_urls();
        info!("Found {} URLs in {sitemap_url}", urls.len());
        Ok(urls)
    }

    fn visit<'a>(&'a self, state: &'a CrawlState, document_url: String) -> BoxFuture<'a, Result<()>> {
        async move {
            if !state.mark_visited(&document_url) {
                debug!("Skipping already visited sitemap {document_url}");
                return Ok(());
            }

            let body = self.fetch(&document_url).await?;
            let document = parse_sitemap(&body).map_err(|reason| SlugError::Parse {
                url: document_url.clone(),
                reason,
            })?;

            match document {
                SitemapDocument::Index(children) => {
                    debug!("{document_url} is an index of {} sitemaps", children.len());
                    try_join_all(children.into_iter().map(|child| self.visit(state, child))).await?;
                }
                SitemapDocument::UrlSet(urls) => {
                    debug!("{document_url} lists {} URLs", urls.len());
                    state.add_urls(urls);
                }
                SitemapDocument::Empty => debug!("{document_url} lists nothing"),
            }

            Ok(())
        }
        .boxed()
    }

    async fn fetch(&self, document_url: &str) -> Result<String> {
        let network_error = |source| SlugError::Network {
            url: document_url.to_string(),
            source,
        };

        let response = self
            .client
            .get(http::route(self.relay.as_deref(), document_url))
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SlugError::Fetch {
                url: document_url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(network_error)
    }
}

/// Deduplication sets owned by a single crawl.
#[derive(Default)]
struct CrawlState {
    visited: Mutex<HashSet<String>>,
    discovered: Mutex<DiscoveredUrls>,
}

#[derive(Default)]
struct DiscoveredUrls {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl CrawlState {
    /// Returns `false` if the document was already visited.
    fn mark_visited(&self, document_url: &str) -> bool {
        self.visited
            .lock()
            .expect("Crawl state mutex poisoned")
            .insert(document_url.to_string())
    }

    fn add_urls(&self, urls: Vec<String>) {
        let mut discovered = self.discovered.lock().expect("Crawl state mutex poisoned");
        for url in urls {
            if discovered.seen.insert(url.clone()) {
                discovered.ordered.push(url);
            }
        }
    }

    fn into_urls(self) -> Vec<String> {
        self.discovered
            .into_inner()
            .expect("Crawl state mutex poisoned")
            .ordered
    }
}

/// What a single sitemap document lists.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SitemapDocument {
    /// `<sitemapindex><sitemap><loc>` entries
    Index(Vec<String>),
    /// `<urlset><url><loc>` entries
    UrlSet(Vec<String>),
    Empty,
}

/// Parses a sitemap document, returning the reason when the XML is malformed.
///
/// A document that lists any child sitemap is treated as an index and its page
/// entries, if any, are ignored.
pub(crate) fn parse_sitemap(xml: &str) -> std::result::Result<SitemapDocument, String> {
    let mut reader = Reader::from_str(xml.trim_start_matches('\u{feff}'));
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut open_elements: Vec<String> = Vec::new();
    let mut root_seen = false;
    let mut location: Option<String> = None;
    let mut sitemap_locations = Vec::new();
    let mut url_locations = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if open_elements.is_empty() {
                    enter_root(&mut root_seen)?;
                }
                let name = local_name(e);
                if name == "loc" && is_entry(open_elements.last()) {
                    location = Some(String::new());
                }
                open_elements.push(name);
            }
            Ok(Event::Empty(_)) => {
                if open_elements.is_empty() {
                    enter_root(&mut root_seen)?;
                }
            }
            Ok(Event::End(_)) => {
                let name = open_elements
                    .pop()
                    .ok_or_else(|| "closing tag without a matching opening tag".to_string())?;
                if name == "loc"
                    && let Some(text) = location.take()
                {
                    let text = text.trim();
                    if !text.is_empty() {
                        match open_elements.last().map(String::as_str) {
                            Some("sitemap") => sitemap_locations.push(text.to_string()),
                            Some("url") => url_locations.push(text.to_string()),
                            _ => {}
                        }
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if open_elements.is_empty() {
                    return Err("text outside of the root element".to_string());
                }
                let text = e.unescape().map_err(|err| err.to_string())?;
                if let Some(location) = location.as_mut() {
                    location.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(location) = location.as_mut() {
                    location.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(err.to_string()),
            _ => {}
        }
        buf.clear();
    }

    if let Some(unclosed) = open_elements.last() {
        return Err(format!("unclosed element <{unclosed}>"));
    }
    if !root_seen {
        return Err("document has no root element".to_string());
    }

    Ok(if !sitemap_locations.is_empty() {
        SitemapDocument::Index(sitemap_locations)
    } else if !url_locations.is_empty() {
        SitemapDocument::UrlSet(url_locations)
    } else {
        SitemapDocument::Empty
    })
}

fn enter_root(root_seen: &mut bool) -> std::result::Result<(), String> {
    if *root_seen {
        return Err("junk after the root element".to_string());
    }
    *root_seen = true;
    Ok(())
}

fn local_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

fn is_entry(parent: Option<&String>) -> bool {
    matches!(parent.map(String::as_str), Some("url" | "sitemap"))
}
