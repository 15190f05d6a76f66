use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::models::classification::{ClassifyMode, PageClassification};
use crate::models::job::Job;
use crate::pipeline::{ExtractDecision, extract_router};
use crate::providers::{JobExtractor, PageClassifier, PageFetcher};

/// Limits applied to the concurrent page processor.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Maximum URLs in flight at once.
    pub max_concurrency: usize,
    /// Hard wall-clock window for one page fetch.
    pub fetch_timeout: Duration,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        ProcessorConfig {
            max_concurrency: 5,
            fetch_timeout: Duration::from_secs(20),
        }
    }
}

/// Result of processing one URL batch, merged into the run state as a
/// single update.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub jobs: Vec<Job>,
    pub job_board_urls: Vec<String>,
}

enum PageOutcome {
    Job(Box<Job>),
    JobBoard,
    Irrelevant,
}

/// Fetch, classify, and conditionally extract every URL in the batch under
/// the concurrency cap.
///
/// Any per-URL failure (fetch error, timeout, classification or extraction
/// error, task panic) resolves to "no job for this URL" and never aborts
/// the batch. Results are merged in input-URL order.
pub async fn process_batch(
    urls: &[String],
    fetcher: Arc<dyn PageFetcher>,
    classifier: Arc<dyn PageClassifier>,
    extractor: Arc<dyn JobExtractor>,
    config: &ProcessorConfig,
) -> BatchOutcome {
    if urls.is_empty() {
        return BatchOutcome::default();
    }

    let semaphore = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
    let mut tasks: JoinSet<(usize, PageOutcome)> = JoinSet::new();

    for (index, url) in urls.iter().cloned().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let fetcher = Arc::clone(&fetcher);
        let classifier = Arc::clone(&classifier);
        let extractor = Arc::clone(&extractor);
        let fetch_timeout = config.fetch_timeout;

        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return (index, PageOutcome::Irrelevant);
            };
            let outcome =
                process_url(&url, &*fetcher, &*classifier, &*extractor, fetch_timeout).await;
            (index, outcome)
        });
    }

    let mut slots: Vec<Option<PageOutcome>> = (0..urls.len()).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => slots[index] = Some(outcome),
            Err(e) => tracing::warn!("page task panicked: {e}"),
        }
    }

    let mut outcome = BatchOutcome::default();
    for (index, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(PageOutcome::Job(job)) => outcome.jobs.push(*job),
            Some(PageOutcome::JobBoard) => outcome.job_board_urls.push(urls[index].clone()),
            Some(PageOutcome::Irrelevant) | None => {}
        }
    }

    tracing::info!(
        urls = urls.len(),
        jobs = outcome.jobs.len(),
        job_boards = outcome.job_board_urls.len(),
        "page batch complete"
    );
    outcome
}

async fn process_url(
    url: &str,
    fetcher: &dyn PageFetcher,
    classifier: &dyn PageClassifier,
    extractor: &dyn JobExtractor,
    fetch_timeout: Duration,
) -> PageOutcome {
    let page_text = match tokio::time::timeout(fetch_timeout, fetcher.fetch(url)).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            tracing::warn!(url, "fetch failed: {e:#}");
            return PageOutcome::Irrelevant;
        }
        Err(_) => {
            tracing::warn!(url, timeout_secs = fetch_timeout.as_secs(), "fetch timed out");
            return PageOutcome::Irrelevant;
        }
    };

    if page_text.trim().is_empty() {
        tracing::debug!(url, "page yielded no text");
        return PageOutcome::Irrelevant;
    }

    let classification = match classifier.classify(&page_text, ClassifyMode::Broad).await {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(url, "classification failed, treating as irrelevant: {e:#}");
            PageClassification::Irrelevant
        }
    };

    match extract_router(classification) {
        ExtractDecision::Skip => match classification {
            PageClassification::JobBoard => PageOutcome::JobBoard,
            _ => PageOutcome::Irrelevant,
        },
        ExtractDecision::Extract => match extractor.extract(&page_text).await {
            Ok(Some(mut job)) => {
                // Provenance comes from the fetched URL, never the extractor.
                job.source_url = url.to_string();
                tracing::info!(url, title = %job.title, "extracted job");
                PageOutcome::Job(Box::new(job))
            }
            Ok(None) => {
                tracing::debug!(url, "extractor found no job");
                PageOutcome::Irrelevant
            }
            Err(e) => {
                tracing::warn!(url, "extraction failed: {e:#}");
                PageOutcome::Irrelevant
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::Result;
    use async_trait::async_trait;

    use super::*;

    /// Fetcher that tracks the number of concurrently running fetches and
    /// fails for URLs containing "broken" by sleeping past the timeout.
    struct InstrumentedFetcher {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl InstrumentedFetcher {
        fn new() -> Self {
            InstrumentedFetcher {
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    /// Decrements the in-flight counter even when the fetch future is
    /// cancelled by the per-URL timeout.
    struct FlightGuard<'a>(&'a AtomicUsize);

    impl Drop for FlightGuard<'_> {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl PageFetcher for InstrumentedFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            let _guard = FlightGuard(&self.in_flight);
            if url.contains("broken") {
                // Hang until the per-URL timeout fires.
                tokio::time::sleep(Duration::from_secs(3600)).await;
                unreachable!("timeout should have fired")
            } else {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(format!("Job posting at {url}. Responsibilities and qualifications."))
            }
        }
    }

    struct KeywordClassifier;

    #[async_trait]
    impl PageClassifier for KeywordClassifier {
        async fn classify(&self, page_text: &str, _mode: ClassifyMode) -> Result<PageClassification> {
            if page_text.contains("board") {
                Ok(PageClassification::JobBoard)
            } else if page_text.contains("Job posting") {
                Ok(PageClassification::JobDescription)
            } else {
                Ok(PageClassification::Irrelevant)
            }
        }
    }

    struct EchoExtractor;

    #[async_trait]
    impl JobExtractor for EchoExtractor {
        async fn extract(&self, page_text: &str) -> Result<Option<Job>> {
            Ok(Some(Job {
                title: "Engineer".to_string(),
                company: "Acme".to_string(),
                description: page_text.to_string(),
                source_url: "https://wrong.example/guessed".to_string(),
                ..Default::default()
            }))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn respects_concurrency_cap_and_isolates_failures() {
        let urls: Vec<String> = (0..20)
            .map(|i| {
                if i % 4 == 3 {
                    format!("https://site.example/broken/{i}")
                } else {
                    format!("https://site.example/jobs/{i}")
                }
            })
            .collect();
        let fetcher = Arc::new(InstrumentedFetcher::new());
        let config = ProcessorConfig {
            max_concurrency: 5,
            fetch_timeout: Duration::from_secs(10),
        };

        let outcome = process_batch(
            &urls,
            fetcher.clone(),
            Arc::new(KeywordClassifier),
            Arc::new(EchoExtractor),
            &config,
        )
        .await;

        assert!(fetcher.max_in_flight.load(Ordering::SeqCst) <= 5);
        // 5 of the 20 URLs time out; the other 15 still extract.
        assert_eq!(outcome.jobs.len(), 15);
        assert!(outcome.job_board_urls.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn overwrites_source_url_and_separates_job_boards() {
        struct BoardFetcher;

        #[async_trait]
        impl PageFetcher for BoardFetcher {
            async fn fetch(&self, url: &str) -> Result<String> {
                if url.contains("board") {
                    Ok("board with many openings".to_string())
                } else {
                    Ok(format!("Job posting at {url}"))
                }
            }
        }

        let urls = vec![
            "https://site.example/jobs/1".to_string(),
            "https://boards.example/list".to_string(),
        ];

        let outcome = process_batch(
            &urls,
            Arc::new(BoardFetcher),
            Arc::new(KeywordClassifier),
            Arc::new(EchoExtractor),
            &ProcessorConfig::default(),
        )
        .await;

        assert_eq!(outcome.jobs.len(), 1);
        assert_eq!(outcome.jobs[0].source_url, "https://site.example/jobs/1");
        assert_eq!(outcome.job_board_urls, vec![
            "https://boards.example/list".to_string()
        ]);
    }
}
