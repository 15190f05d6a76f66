use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::providers::{SearchHit, SearchProvider};

const API_URL: &str = "https://api.search.brave.com/res/v1/web/search";

/// Brave Web Search API client.
///
/// Brave enforces a 1 request/second limit on the free tier; the discovery
/// stage is responsible for pacing calls, this client only performs them.
pub struct BraveSearch {
    client: reqwest::Client,
    api_key: String,
    count: u32,
}

impl BraveSearch {
    pub fn new(api_key: String, count: u32) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("failed to build Brave Search HTTP client")?;
        Ok(BraveSearch {
            client,
            api_key,
            count: count.clamp(1, 20),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    web: Option<WebResults>,
}

#[derive(Debug, Deserialize)]
struct WebResults {
    #[serde(default)]
    results: Vec<WebResult>,
}

#[derive(Debug, Deserialize)]
struct WebResult {
    url: String,
    #[serde(default)]
    title: Option<String>,
}

#[async_trait]
impl SearchProvider for BraveSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let resp = self
            .client
            .get(API_URL)
            .query(&[("q", query), ("count", &self.count.to_string())])
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .send()
            .await
            .context("Brave Search request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Brave Search returned {status} for query '{query}'");
        }

        let body: SearchResponse = resp
            .json()
            .await
            .context("failed to parse Brave Search response")?;

        let hits = body
            .web
            .map(|w| w.results)
            .unwrap_or_default()
            .into_iter()
            .map(|r| SearchHit {
                url: r.url,
                title: r.title,
            })
            .collect();
        Ok(hits)
    }
}
