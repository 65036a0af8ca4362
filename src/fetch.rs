//! Document retrieval.
//!
//! Fetches the page markup plus its stylesheet text in a single pass. This
//! is the only pipeline stage whose failure is fatal; it makes exactly one
//! attempt and leaves retrying to the caller.

use chrono::Utc;
use futures::future::BoxFuture;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::{BexError, Result};
use crate::types::CapturedDocument;

/// User-Agent string for document requests.
const USER_AGENT: &str = concat!("bex/", env!("CARGO_PKG_VERSION"));

/// Linked stylesheets fetched per page, at most.
const MAX_STYLESHEETS: usize = 8;

/// Source of page documents. The pipeline owns one; tests inject stubs.
pub trait DocumentSource: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<CapturedDocument>>;
}

pub struct HttpDocumentFetcher {
    http: Client,
}

impl HttpDocumentFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()
            .map_err(BexError::Network)?;
        Ok(Self { http })
    }

    async fn fetch_page(&self, url: &Url) -> Result<CapturedDocument> {
        let response = self
            .http
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| BexError::fetch(url.as_str(), None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BexError::fetch(
                url.as_str(),
                Some(status),
                format!("HTTP {status}"),
            ));
        }

        let html = response
            .text()
            .await
            .map_err(|e| BexError::fetch(url.as_str(), Some(status), format!("body read failed: {e}")))?;

        let (mut stylesheet_text, hrefs) = collect_style_sources(&html, url);

        for href in hrefs.iter().take(MAX_STYLESHEETS) {
            match self.fetch_stylesheet(href).await {
                Ok(css) => {
                    stylesheet_text.push('\n');
                    stylesheet_text.push_str(&css);
                }
                Err(e) => {
                    // A stylesheet is nice to have; only the page is fatal.
                    warn!(stylesheet = %href, error = %e, "stylesheet fetch skipped");
                }
            }
        }

        debug!(
            url = %url,
            html_len = html.len(),
            css_len = stylesheet_text.len(),
            "document captured"
        );

        Ok(CapturedDocument {
            url: url.clone(),
            html,
            stylesheet_text,
            fetched_at: Utc::now(),
        })
    }

    async fn fetch_stylesheet(&self, href: &Url) -> Result<String> {
        let response = self
            .http
            .get(href.as_str())
            .send()
            .await
            .map_err(BexError::Network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(BexError::fetch(
                href.as_str(),
                Some(status),
                format!("HTTP {status}"),
            ));
        }
        response.text().await.map_err(BexError::Network)
    }
}

impl DocumentSource for HttpDocumentFetcher {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<CapturedDocument>> {
        Box::pin(self.fetch_page(url))
    }
}

/// Pulls inline `<style>` text and linked stylesheet URLs out of the markup.
/// Parsing happens here, synchronously, so the DOM never crosses an await.
fn collect_style_sources(html: &str, base: &Url) -> (String, Vec<Url>) {
    let doc = Html::parse_document(html);

    let style_sel = Selector::parse("style").expect("style selector");
    let mut inline = String::new();
    for el in doc.select(&style_sel) {
        inline.push_str(&el.text().collect::<String>());
        inline.push('\n');
    }

    let link_sel = Selector::parse(r#"link[rel="stylesheet"]"#).expect("stylesheet selector");
    let mut hrefs = Vec::new();
    for el in doc.select(&link_sel) {
        if let Some(href) = el.value().attr("href") {
            if let Ok(resolved) = base.join(href) {
                hrefs.push(resolved);
            }
        }
    }

    (inline, hrefs)
}
