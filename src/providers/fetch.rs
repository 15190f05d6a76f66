use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::providers::PageFetcher;

/// Cap on the text handed to downstream classification/extraction.
const MAX_PAGE_TEXT_CHARS: usize = 15_000;

/// Selectors likely to wrap the job posting body, tried before falling back
/// to the whole page.
const CONTENT_SELECTORS: &[&str] = &[
    r#"div[class*="job-description"]"#,
    ".job-details",
    "#jobDescription",
    r#"main[role="main"]"#,
    "main",
    "article",
];

/// Plain HTTP page fetcher with HTML-to-text reduction.
///
/// Builds a fresh client per call so no cookies or connection state are
/// shared between URLs; the page processor additionally wraps each call in
/// its own wall-clock timeout.
pub struct HttpFetcher {
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        HttpFetcher { timeout }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36")
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("failed to build fetch client")?;

        let resp = client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {status} for {url}");
        }

        let html = resp
            .text()
            .await
            .with_context(|| format!("failed to read body of {url}"))?;

        Ok(extract_page_text(&html))
    }
}

/// Reduce an HTML document to whitespace-normalized text, preferring a
/// focused content region when one of the known selectors matches.
pub fn extract_page_text(html: &str) -> String {
    let document = Html::parse_document(html);

    for selector_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text = collapse_whitespace(element.text());
            if !text.is_empty() {
                return truncate_chars(&text, MAX_PAGE_TEXT_CHARS);
            }
        }
    }

    let text = match Selector::parse("body") {
        Ok(body) => match document.select(&body).next() {
            Some(element) => collapse_whitespace(element.text()),
            None => collapse_whitespace(document.root_element().text()),
        },
        Err(_) => collapse_whitespace(document.root_element().text()),
    };
    truncate_chars(&text, MAX_PAGE_TEXT_CHARS)
}

fn collapse_whitespace<'a>(chunks: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for chunk in chunks {
        for word in chunk.split_whitespace() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(word);
        }
    }
    out
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}
