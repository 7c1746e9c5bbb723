// src/worker/html.rs
// =============================================================================
// This module pulls more URLs out of HTML pages the workers fetch.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Every URL found is handed to the queue's add function. The queue decides
// whether it is in scope and whether it has been seen before.
// =============================================================================

use super::PageWorker;
use crate::queue::AddFn;
use crate::transport::{FetchResponse, ResponseBody};
use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

// Elements that point at other resources on the site
const LINK_SELECTOR: &str = "a[href], link[href], script[src], img[src], iframe[src], form[action]";

pub struct HtmlWorker {
    adder: AddFn,
}

impl HtmlWorker {
    pub fn new(adder: AddFn) -> Self {
        Self { adder }
    }
}

#[async_trait]
impl PageWorker for HtmlWorker {
    // Only successful HTML responses are parsed
    fn eligible(&self, response: &FetchResponse) -> bool {
        let is_html = response
            .content_type
            .as_deref()
            .map(|ct| ct.trim().to_ascii_lowercase().starts_with("text/html"))
            .unwrap_or(false);
        is_html && (200..300).contains(&response.status)
    }

    async fn handle(&self, url: &Url, body: ResponseBody) {
        let html = match body.text().await {
            Ok(html) => html,
            Err(e) => {
                warn!(%url, error = %e, "Could not read page body");
                return;
            }
        };

        let links = extract_page_links(&html, url);
        debug!(%url, count = links.len(), "Extracted links from page");
        for link in links {
            (self.adder)(link);
        }
    }
}

// Extracts all http(s) URLs referenced by an HTML page
//
// Parameters:
//   html: the HTML content to parse
//   base: the URL of the page (for resolving relative links)
//
// Returns: absolute URLs in document order (duplicates included)
//
// Example:
//   html = "<a href='/docs'>Docs</a>"
//   base = "https://example.com/page"
//   result = ["https://example.com/docs"]
pub fn extract_page_links(html: &str, base: &Url) -> Vec<Url> {
    let mut links = Vec::new();

    let selector = match Selector::parse(LINK_SELECTOR) {
        Ok(selector) => selector,
        Err(_) => return links,
    };
    let document = Html::parse_document(html);

    for element in document.select(&selector) {
        let attrs = element.value();
        let target = attrs
            .attr("href")
            .or_else(|| attrs.attr("src"))
            .or_else(|| attrs.attr("action"));

        if let Some(url) = target.and_then(|t| resolve_url(base, t)) {
            links.push(url);
        }
    }

    links
}

// Resolves a possibly-relative reference to an absolute http(s) URL
//
// Examples:
//   base = "https://example.com/page"
//   href = "/docs"              -> Some("https://example.com/docs")
//   href = "#top"               -> None (same page)
//   href = "mailto:a@b.c"       -> None (not HTTP)
fn resolve_url(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let url = base.join(href).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn base() -> Url {
        Url::parse("https://example.com/page/").unwrap()
    }

    fn strings(links: Vec<Url>) -> Vec<String> {
        links.into_iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<a href="https://www.rust-lang.org">Rust</a>"#;
        let links = extract_page_links(html, &base());
        assert_eq!(strings(links), vec!["https://www.rust-lang.org/"]);
    }

    #[test]
    fn test_resolve_relative_link() {
        let html = r#"<a href="/docs">Docs</a><a href="../about">About</a>"#;
        let links = extract_page_links(html, &base());
        assert_eq!(
            strings(links),
            vec!["https://example.com/docs", "https://example.com/about"]
        );
    }

    #[test]
    fn test_other_elements() {
        let html = r#"
            <link rel="stylesheet" href="/static/site.css">
            <script src="app.js"></script>
            <img src="/img/logo.png">
            <form action="/login.php"></form>
        "#;
        let links = extract_page_links(html, &base());
        assert_eq!(
            strings(links),
            vec![
                "https://example.com/static/site.css",
                "https://example.com/page/app.js",
                "https://example.com/img/logo.png",
                "https://example.com/login.php"
            ]
        );
    }

    #[test]
    fn test_skip_mailto_and_anchor() {
        let html = r##"<a href="mailto:test@example.com">Email</a><a href="#top">Top</a>"##;
        assert!(extract_page_links(html, &base()).is_empty());
    }

    #[test]
    fn test_eligible() {
        let worker = HtmlWorker::new(Arc::new(|_: Url| {}));

        let html = FetchResponse::buffered(200, "").with_content_type("text/html; charset=utf-8");
        assert!(worker.eligible(&html));

        let missing = FetchResponse::buffered(404, "").with_content_type("text/html");
        assert!(!worker.eligible(&missing));

        let json = FetchResponse::buffered(200, "").with_content_type("application/json");
        assert!(!worker.eligible(&json));

        assert!(!worker.eligible(&FetchResponse::buffered(200, "")));
    }

    #[tokio::test]
    async fn test_handle_feeds_adder() {
        let added = Arc::new(Mutex::new(Vec::new()));
        let adder: AddFn = {
            let added = Arc::clone(&added);
            Arc::new(move |url: Url| added.lock().unwrap().push(url.to_string()))
        };
        let worker = HtmlWorker::new(adder);

        let body = ResponseBody::Buffered(r#"<a href="/a">a</a><a href="b">b</a>"#.to_string());
        worker.handle(&base(), body).await;

        assert_eq!(
            *added.lock().unwrap(),
            vec!["https://example.com/a", "https://example.com/page/b"]
        );
    }
}
