mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use common::{BagEmbedder, FixedGeocoder};
use jobscout::error::PipelineError;
use jobscout::models::classification::{ClassifyMode, PageClassification};
use jobscout::models::job::Job;
use jobscout::pipeline::{Pipeline, PipelineConfig};
use jobscout::providers::{
    JobExtractor, PageClassifier, PageFetcher, Providers, QueryCrafter, SearchHit, SearchProvider,
    StatusSink, StatusUpdate,
};

struct TwoQueryCrafter;

#[async_trait]
impl QueryCrafter for TwoQueryCrafter {
    async fn craft_queries(&self, _resume: &str, prompt: &str) -> Result<Vec<String>> {
        Ok(vec![format!("{prompt} remote"), format!("{prompt} berlin")])
    }
}

struct FailingCrafter;

#[async_trait]
impl QueryCrafter for FailingCrafter {
    async fn craft_queries(&self, _resume: &str, _prompt: &str) -> Result<Vec<String>> {
        Err(anyhow!("model unavailable"))
    }
}

/// Canned search with overlapping result sets across queries.
struct CannedSearch {
    results: HashMap<String, Vec<&'static str>>,
}

#[async_trait]
impl SearchProvider for CannedSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let urls = self.results.get(query).cloned().unwrap_or_default();
        Ok(urls
            .into_iter()
            .map(|u| SearchHit {
                url: u.to_string(),
                title: None,
            })
            .collect())
    }
}

struct EmptySearch;

#[async_trait]
impl SearchProvider for EmptySearch {
    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
        Ok(Vec::new())
    }
}

/// Serves canned page text and records every URL it was asked for.
struct CannedFetcher {
    pages: HashMap<&'static str, &'static str>,
    fetched: Mutex<Vec<String>>,
}

#[async_trait]
impl PageFetcher for CannedFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .map(|t| t.to_string())
            .ok_or_else(|| anyhow!("no page for {url}"))
    }
}

/// Classifies by marker words embedded in the canned pages.
struct MarkerClassifier;

#[async_trait]
impl PageClassifier for MarkerClassifier {
    async fn classify(&self, page_text: &str, _mode: ClassifyMode) -> Result<PageClassification> {
        if page_text.contains("apply now") {
            Ok(PageClassification::JobDescription)
        } else if page_text.contains("open positions") {
            Ok(PageClassification::JobBoard)
        } else {
            Ok(PageClassification::Irrelevant)
        }
    }
}

/// Extracts `title :: description` from the first line of the page.
struct LineExtractor;

#[async_trait]
impl JobExtractor for LineExtractor {
    async fn extract(&self, page_text: &str) -> Result<Option<Job>> {
        let first = page_text.lines().next().unwrap_or_default();
        let Some((title, description)) = first.split_once(" :: ") else {
            return Ok(None);
        };
        Ok(Some(Job {
            title: title.to_string(),
            company: "Canned Co".to_string(),
            description: description.to_string(),
            ..Job::default()
        }))
    }
}

#[derive(Default)]
struct RecordingSink {
    updates: Mutex<Vec<StatusUpdate>>,
}

#[async_trait]
impl StatusSink for RecordingSink {
    async fn publish(&self, update: StatusUpdate) -> Result<()> {
        self.updates.lock().unwrap().push(update);
        Ok(())
    }
}

const ML_PAGE: &str = "Senior Machine Learning Engineer :: Senior machine learning \
    engineer role, 5+ years of python, tensorflow, pytorch and aws. apply now";
const FRONTEND_PAGE: &str = "Frontend Developer :: Build pages with react, css and \
    html, 2+ years of experience. apply now";
const BOARD_PAGE: &str = "All openings\nBrowse our open positions by team.";
const BLOG_PAGE: &str = "Why we rewrote our billing system, part 3.";

fn canned_providers(sink: Arc<RecordingSink>) -> (Providers, Arc<CannedFetcher>) {
    let mut results = HashMap::new();
    // The ML listing appears under both queries; it must be fetched once.
    results.insert(
        "machine learning engineer remote".to_string(),
        vec![
            "https://jobs.example.com/ml",
            "https://jobs.example.com/board",
            "https://blog.example.com/billing",
        ],
    );
    results.insert(
        "machine learning engineer berlin".to_string(),
        vec![
            "https://jobs.example.com/ml",
            "https://jobs.example.com/frontend",
        ],
    );

    let mut pages = HashMap::new();
    pages.insert("https://jobs.example.com/ml", ML_PAGE);
    pages.insert("https://jobs.example.com/frontend", FRONTEND_PAGE);
    pages.insert("https://jobs.example.com/board", BOARD_PAGE);
    pages.insert("https://blog.example.com/billing", BLOG_PAGE);

    let fetcher = Arc::new(CannedFetcher {
        pages,
        fetched: Mutex::new(Vec::new()),
    });

    let providers = Providers {
        query_crafter: Arc::new(TwoQueryCrafter),
        search: Arc::new(CannedSearch { results }),
        fetcher: fetcher.clone(),
        classifier: Arc::new(MarkerClassifier),
        extractor: Arc::new(LineExtractor),
        embedder: Arc::new(BagEmbedder),
        geocoder: Arc::new(FixedGeocoder),
        status: sink,
    };
    (providers, fetcher)
}

const RESUME: &str = "Senior machine learning engineer, 5+ years of python with \
    tensorflow and pytorch on aws.";
const PROMPT: &str = "machine learning engineer";

#[tokio::test(start_paused = true)]
async fn full_run_discovers_dedupes_and_ranks() {
    let sink = Arc::new(RecordingSink::default());
    let (providers, fetcher) = canned_providers(sink.clone());
    let pipeline = Pipeline::new(providers, PipelineConfig::default());

    let jobs = pipeline.run(RESUME, PROMPT).await.unwrap();

    // Both extracted listings score above the floor; ML outranks frontend.
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].title, "Senior Machine Learning Engineer");
    assert!(jobs[0].score.unwrap() >= jobs[1].score.unwrap());
    assert_eq!(jobs[0].source_url, "https://jobs.example.com/ml");

    // Four distinct URLs discovered across both queries, each fetched once.
    let mut fetched = fetcher.fetched.lock().unwrap().clone();
    fetched.sort();
    assert_eq!(
        fetched,
        vec![
            "https://blog.example.com/billing",
            "https://jobs.example.com/board",
            "https://jobs.example.com/frontend",
            "https://jobs.example.com/ml",
        ]
    );

    // Progress runs through every stage and finishes at 100.
    let updates = sink.updates.lock().unwrap();
    let stages: Vec<&str> = updates.iter().map(|u| u.stage).collect();
    assert_eq!(
        stages,
        vec![
            "crafting_query",
            "discovering",
            "processing_urls",
            "ranking",
            "done"
        ]
    );
    assert_eq!(updates.last().unwrap().progress_percent, 100);
    assert!(updates.iter().all(|u| u.partial_error.is_none()));
}

#[tokio::test(start_paused = true)]
async fn empty_discovery_completes_with_no_jobs() {
    let sink = Arc::new(RecordingSink::default());
    let (mut providers, _) = canned_providers(sink.clone());
    providers.search = Arc::new(EmptySearch);
    let pipeline = Pipeline::new(providers, PipelineConfig::default());

    let jobs = pipeline.run(RESUME, PROMPT).await.unwrap();

    assert!(jobs.is_empty());
    assert_eq!(sink.updates.lock().unwrap().last().unwrap().stage, "done");
}

#[tokio::test(start_paused = true)]
async fn crafter_failure_degrades_to_raw_prompt() {
    let sink = Arc::new(RecordingSink::default());
    let (mut providers, _) = canned_providers(sink);
    providers.query_crafter = Arc::new(FailingCrafter);
    // Canned search has no entry for the raw prompt, so discovery comes up
    // empty, but the run itself must still complete.
    let pipeline = Pipeline::new(providers, PipelineConfig::default());

    let jobs = pipeline.run(RESUME, PROMPT).await.unwrap();
    assert!(jobs.is_empty());
}

#[tokio::test]
async fn blank_inputs_are_rejected_before_any_stage() {
    let sink = Arc::new(RecordingSink::default());
    let (providers, fetcher) = canned_providers(sink.clone());
    let pipeline = Pipeline::new(providers, PipelineConfig::default());

    let err = pipeline.run("   ", PROMPT).await.unwrap_err();
    assert!(matches!(err, PipelineError::MissingInput("resume text")));

    let err = pipeline.run(RESUME, "").await.unwrap_err();
    assert!(matches!(err, PipelineError::MissingInput("search prompt")));

    assert!(sink.updates.lock().unwrap().is_empty());
    assert!(fetcher.fetched.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn exhausted_stage_budget_surfaces_as_error() {
    let sink = Arc::new(RecordingSink::default());
    let (providers, _) = canned_providers(sink.clone());
    let config = PipelineConfig {
        stage_budget: 2,
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(providers, config);

    let err = pipeline.run(RESUME, PROMPT).await.unwrap_err();
    assert!(matches!(err, PipelineError::BudgetExceeded(2)));

    // The failure is reported through the sink before the run aborts.
    let updates = sink.updates.lock().unwrap();
    let last = updates.last().unwrap();
    assert!(last.partial_error.as_deref().unwrap().contains("budget"));
}
