//! Pipeline orchestrator: a closed set of stages driven by a `match`
//! dispatcher, with pure router functions deciding the conditional edges
//! and a transition budget guaranteeing termination.

pub mod discovery;
pub mod processor;

use std::time::Duration;

use crate::error::PipelineError;
use crate::models::classification::PageClassification;
use crate::models::job::Job;
use crate::models::run_state::RunState;
use crate::providers::{Providers, StatusUpdate};
use crate::ranking::location::GeocodeCache;
use crate::ranking::{RankParams, RankingDeps, rank_and_filter};
use processor::ProcessorConfig;

/// Stage identifiers of the run graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CraftQuery,
    Discover,
    ProcessPages,
    Rank,
    Done,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::CraftQuery => "crafting_query",
            Stage::Discover => "discovering",
            Stage::ProcessPages => "processing_urls",
            Stage::Rank => "ranking",
            Stage::Done => "done",
        }
    }

    fn progress_percent(self) -> u8 {
        match self {
            Stage::CraftQuery => 10,
            Stage::Discover => 25,
            Stage::ProcessPages => 50,
            Stage::Rank => 75,
            Stage::Done => 100,
        }
    }
}

/// Decision of the extract-router after a page is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractDecision {
    Extract,
    Skip,
}

/// Only pages classified as a single job description are worth extracting.
pub fn extract_router(classification: PageClassification) -> ExtractDecision {
    match classification {
        PageClassification::JobDescription => ExtractDecision::Extract,
        PageClassification::JobBoard | PageClassification::Irrelevant => ExtractDecision::Skip,
    }
}

/// Loop-closing edge: keep processing while unprocessed URLs remain,
/// otherwise move on to ranking. An empty discovery routes straight to
/// ranking, which produces an empty final list rather than an error.
pub fn continue_router(state: &RunState) -> Stage {
    if state.unprocessed_urls().is_empty() {
        Stage::Rank
    } else {
        Stage::ProcessPages
    }
}

/// Pipeline-wide knobs; see `RankParams` and `ProcessorConfig` for the
/// stage-specific ones.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upper bound on stage executions per run.
    pub stage_budget: usize,
    /// Delay between successive search queries (floored at 1s by discovery).
    pub search_delay: Duration,
    pub processor: ProcessorConfig,
    pub rank: RankParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            stage_budget: 200,
            search_delay: Duration::from_secs(1),
            processor: ProcessorConfig::default(),
            rank: RankParams::default(),
        }
    }
}

/// One end-to-end job search: query crafting, discovery, concurrent page
/// processing, and ranking over a shared run state.
pub struct Pipeline {
    providers: Providers,
    config: PipelineConfig,
    geocode_cache: GeocodeCache,
}

impl Pipeline {
    pub fn new(providers: Providers, config: PipelineConfig) -> Self {
        Pipeline {
            providers,
            config,
            geocode_cache: GeocodeCache::new(),
        }
    }

    /// Run the pipeline for one resume/prompt pair.
    ///
    /// Either completes with a (possibly empty) ranked job list, or fails
    /// with a single structured error naming the violated precondition or
    /// budget. Partial progress is published before a failure surfaces.
    pub async fn run(
        &self,
        resume_text: &str,
        search_prompt: &str,
    ) -> Result<Vec<Job>, PipelineError> {
        if resume_text.trim().is_empty() {
            return Err(PipelineError::MissingInput("resume text"));
        }
        if search_prompt.trim().is_empty() {
            return Err(PipelineError::MissingInput("search prompt"));
        }

        let mut state = RunState::new(resume_text, search_prompt);
        let mut stage = Stage::CraftQuery;
        let mut transitions = 0usize;

        loop {
            if stage == Stage::Done {
                break;
            }
            transitions += 1;
            if transitions > self.config.stage_budget {
                let err = PipelineError::BudgetExceeded(self.config.stage_budget);
                self.publish(stage, Some(err.to_string())).await;
                return Err(err);
            }

            self.publish(stage, None).await;
            tracing::info!(stage = stage.name(), transitions, "entering stage");

            stage = match stage {
                Stage::CraftQuery => {
                    state.search_queries = self.craft_queries(&state).await;
                    Stage::Discover
                }
                Stage::Discover => {
                    discovery::discover(
                        &*self.providers.search,
                        &mut state,
                        self.config.search_delay,
                    )
                    .await;
                    continue_router(&state)
                }
                Stage::ProcessPages => {
                    let batch: Vec<String> = state.unprocessed_urls().to_vec();
                    state.mark_all_processed();
                    let outcome = processor::process_batch(
                        &batch,
                        self.providers.fetcher.clone(),
                        self.providers.classifier.clone(),
                        self.providers.extractor.clone(),
                        &self.config.processor,
                    )
                    .await;
                    // One atomic merge per batch; later stages never observe
                    // a partially processed batch.
                    state.extracted_jobs.extend(outcome.jobs);
                    state.job_board_urls.extend(outcome.job_board_urls);
                    continue_router(&state)
                }
                Stage::Rank => {
                    let deps = RankingDeps {
                        embedder: &*self.providers.embedder,
                        geocoder: &*self.providers.geocoder,
                        geocode_cache: &self.geocode_cache,
                    };
                    state.final_jobs = rank_and_filter(
                        std::mem::take(&mut state.extracted_jobs),
                        &state.resume_text,
                        &state.search_prompt,
                        &deps,
                        &self.config.rank,
                    )
                    .await;
                    Stage::Done
                }
                // Unreachable: Done exits at the top of the loop.
                Stage::Done => break,
            };
        }

        self.publish(Stage::Done, None).await;
        tracing::info!(jobs = state.final_jobs.len(), "pipeline complete");
        Ok(state.final_jobs)
    }

    /// Query crafting with stage-level degradation: if the crafter is
    /// unreachable, the raw search prompt becomes the single query.
    async fn craft_queries(&self, state: &RunState) -> Vec<String> {
        match self
            .providers
            .query_crafter
            .craft_queries(&state.resume_text, &state.search_prompt)
            .await
        {
            Ok(queries) => {
                tracing::info!(count = queries.len(), ?queries, "crafted search queries");
                queries
            }
            Err(e) => {
                tracing::warn!("query crafting failed, falling back to raw prompt: {e:#}");
                vec![state.search_prompt.clone()]
            }
        }
    }

    /// Advisory progress report; a sink failure is logged and swallowed.
    async fn publish(&self, stage: Stage, partial_error: Option<String>) {
        let update = StatusUpdate {
            stage: stage.name(),
            progress_percent: stage.progress_percent(),
            partial_error,
        };
        if let Err(e) = self.providers.status.publish(update).await {
            tracing::warn!(stage = stage.name(), "status publish failed: {e:#}");
        }
    }
}
