use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::pipeline::PipelineConfig;
use crate::pipeline::processor::ProcessorConfig;
use crate::ranking::RankParams;

#[derive(Parser, Debug, Clone)]
#[command(name = "jobscout", about = "Job discovery and ranking pipeline")]
pub struct Config {
    /// Path to the resume as plain text
    #[arg(long)]
    pub resume: PathBuf,

    /// Free-text search prompt guiding the job search
    #[arg(long)]
    pub prompt: String,

    /// Candidate home location for proximity scoring
    #[arg(long)]
    pub location: Option<String>,

    /// Google Generative Language API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: String,

    /// Brave Search API key
    #[arg(long, env = "BRAVE_SEARCH_API_KEY", hide_env_values = true)]
    pub brave_api_key: String,

    /// Results requested per search query
    #[arg(long, env = "SEARCH_COUNT", default_value = "20")]
    pub search_count: u32,

    /// Delay between search queries in milliseconds (floored at 1000)
    #[arg(long, env = "SEARCH_DELAY_MS", default_value = "1000")]
    pub search_delay_ms: u64,

    /// Maximum pages fetched concurrently
    #[arg(long, env = "MAX_CONCURRENCY", default_value = "5")]
    pub max_concurrency: usize,

    /// Per-page fetch timeout in seconds
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value = "20")]
    pub fetch_timeout_secs: u64,

    /// Upper bound on stage executions per run
    #[arg(long, env = "STAGE_BUDGET", default_value = "200")]
    pub stage_budget: usize,

    /// Maximum ranked jobs returned
    #[arg(long, env = "TOP_K", default_value = "100")]
    pub top_k: usize,
}

impl Config {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            stage_budget: self.stage_budget,
            search_delay: Duration::from_millis(self.search_delay_ms),
            processor: ProcessorConfig {
                max_concurrency: self.max_concurrency,
                fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            },
            rank: RankParams {
                top_k: self.top_k,
                candidate_location: self.location.clone(),
                ..Default::default()
            },
        }
    }
}
