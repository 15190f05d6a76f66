use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jobscout::config::Config;
use jobscout::pipeline::Pipeline;
use jobscout::providers::Providers;
use jobscout::providers::brave::BraveSearch;
use jobscout::providers::fetch::HttpFetcher;
use jobscout::providers::gemini::GeminiClient;
use jobscout::providers::nominatim::NominatimGeocoder;
use jobscout::providers::status::LogStatusSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobscout=info")),
        )
        .init();

    let config = Config::parse();

    let resume_text = tokio::fs::read_to_string(&config.resume)
        .await
        .with_context(|| format!("failed to read resume from {}", config.resume.display()))?;

    let gemini = Arc::new(GeminiClient::new(config.google_api_key.clone())?);
    let providers = Providers {
        query_crafter: gemini.clone(),
        search: Arc::new(BraveSearch::new(
            config.brave_api_key.clone(),
            config.search_count,
        )?),
        fetcher: Arc::new(HttpFetcher::new(Duration::from_secs(
            config.fetch_timeout_secs,
        ))),
        classifier: gemini.clone(),
        extractor: gemini.clone(),
        embedder: gemini,
        geocoder: Arc::new(NominatimGeocoder::new()?),
        status: Arc::new(LogStatusSink),
    };

    let pipeline = Pipeline::new(providers, config.pipeline_config());
    let jobs = pipeline
        .run(&resume_text, &config.prompt)
        .await
        .context("job search failed")?;

    if jobs.is_empty() {
        tracing::info!("no jobs were found or extracted");
    }
    println!("{}", serde_json::to_string_pretty(&jobs)?);

    Ok(())
}
