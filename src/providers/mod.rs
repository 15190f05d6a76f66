// Service contracts the pipeline consumes, plus the default implementations.
// Concrete providers are injected; the core never constructs them itself.

pub mod brave;
pub mod fetch;
pub mod gemini;
pub mod nominatim;
pub mod status;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::models::classification::{ClassifyMode, PageClassification};
use crate::models::job::Job;

/// One result row from the search provider.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Advisory progress report published after each stage transition.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub stage: &'static str,
    pub progress_percent: u8,
    pub partial_error: Option<String>,
}

/// Web search over the open web. Failures and malformed payloads are the
/// caller's problem to degrade to empty results, not the provider's.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// Turns a resume and search prompt into a handful of search queries.
#[async_trait]
pub trait QueryCrafter: Send + Sync {
    async fn craft_queries(&self, resume_text: &str, search_prompt: &str) -> Result<Vec<String>>;
}

/// Fetches one page and reduces it to text. Each call must be isolated:
/// no session state leaks between URLs.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Structured page classifier. In `Strict` mode the implementation must not
/// return `JobBoard`.
#[async_trait]
pub trait PageClassifier: Send + Sync {
    async fn classify(&self, page_text: &str, mode: ClassifyMode) -> Result<PageClassification>;
}

/// Structured job extractor. `Ok(None)` means the page yielded no listing.
#[async_trait]
pub trait JobExtractor: Send + Sync {
    async fn extract(&self, page_text: &str) -> Result<Option<Job>>;
}

/// Text embedding. Must be deterministic for identical input within a run.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn encode(&self, text: &str) -> Result<Vec<f32>>;
}

/// Location name to coordinates. `Ok(None)` means the location is unknown.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, location: &str) -> Result<Option<(f64, f64)>>;
}

/// Best-effort status sink; publish failures are logged and swallowed by
/// the orchestrator.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn publish(&self, update: StatusUpdate) -> Result<()>;
}

/// Bundle of injected service handles with process lifetime.
#[derive(Clone)]
pub struct Providers {
    pub query_crafter: Arc<dyn QueryCrafter>,
    pub search: Arc<dyn SearchProvider>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub classifier: Arc<dyn PageClassifier>,
    pub extractor: Arc<dyn JobExtractor>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub geocoder: Arc<dyn Geocoder>,
    pub status: Arc<dyn StatusSink>,
}
