use mockito::{Matcher, Mock, ServerGuard};

/// Builds a `<sitemapindex>` listing the given child sitemaps.
#[allow(dead_code)]
pub fn sitemap_index(children: &[&str]) -> String {
    let entries: String = children
        .iter()
        .map(|child| format!("  <sitemap><loc>{child}</loc></sitemap>\n"))
        .collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <sitemapindex xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{entries}</sitemapindex>"
    )
}

/// Builds a `<urlset>` listing the given page locations verbatim.
#[allow(dead_code)]
pub fn url_set(locations: &[&str]) -> String {
    let entries: String = locations
        .iter()
        .map(|location| format!("  <url><loc>{location}</loc><changefreq>weekly</changefreq></url>\n"))
        .collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{entries}</urlset>"
    )
}

/// Serves `xml` at `path`, expecting exactly one request.
#[allow(dead_code)]
pub async fn serve_xml(server: &mut ServerGuard, path: &str, xml: &str) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "application/xml")
        .with_body(xml)
        .expect(1)
        .create_async()
        .await
}

/// Serves `xml` for relayed requests whose query mentions `target`.
#[allow(dead_code)]
pub async fn serve_relayed_xml(server: &mut ServerGuard, target: &str, xml: &str) -> Mock {
    server
        .mock("GET", "/relay")
        .match_query(Matcher::Regex(regex::escape(target)))
        .with_status(200)
        .with_header("content-type", "application/xml")
        .with_body(xml)
        .expect(1)
        .create_async()
        .await
}
