use std::collections::HashSet;

use crate::models::job::Job;

/// Mutable record threaded through the pipeline stages for one run.
///
/// Owned by the orchestrator; each stage receives it by reference and its
/// results are merged back as a single update before the next stage starts.
/// URL processing runs in batches, so there is no per-URL cursor; the
/// `processed` watermark tracks how far into `discovered_urls` the page
/// processor has consumed.
#[derive(Debug, Default)]
pub struct RunState {
    pub resume_text: String,
    pub search_prompt: String,
    pub search_queries: Vec<String>,
    discovered_urls: Vec<String>,
    seen_urls: HashSet<String>,
    processed: usize,
    pub extracted_jobs: Vec<Job>,
    pub job_board_urls: Vec<String>,
    pub final_jobs: Vec<Job>,
}

impl RunState {
    pub fn new(resume_text: impl Into<String>, search_prompt: impl Into<String>) -> Self {
        RunState {
            resume_text: resume_text.into(),
            search_prompt: search_prompt.into(),
            ..Default::default()
        }
    }

    /// Insert a discovered URL, de-duplicating by exact string match.
    /// Returns whether the URL was new.
    pub fn push_url(&mut self, url: String) -> bool {
        if self.seen_urls.contains(&url) {
            return false;
        }
        self.seen_urls.insert(url.clone());
        self.discovered_urls.push(url);
        true
    }

    pub fn discovered_urls(&self) -> &[String] {
        &self.discovered_urls
    }

    /// URLs discovered but not yet handed to the page processor.
    pub fn unprocessed_urls(&self) -> &[String] {
        &self.discovered_urls[self.processed..]
    }

    /// Advance the processing watermark past everything discovered so far.
    pub fn mark_all_processed(&mut self) {
        self.processed = self.discovered_urls.len();
    }
}
