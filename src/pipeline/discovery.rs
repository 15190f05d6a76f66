use std::time::Duration;

use url::Url;

use crate::models::run_state::RunState;
use crate::providers::SearchProvider;

/// Floor on the inter-query delay. The search provider throttles faster
/// callers, so pacing is a correctness requirement, not an optimization.
const MIN_QUERY_DELAY: Duration = Duration::from_secs(1);

/// Run every query against the search provider sequentially, merging hits
/// into the run state's discovered-URL set.
///
/// A failing or malformed query contributes zero results and never fails
/// the stage. Returns the number of newly discovered URLs.
pub async fn discover(
    search: &dyn SearchProvider,
    state: &mut RunState,
    delay: Duration,
) -> usize {
    let delay = delay.max(MIN_QUERY_DELAY);
    let queries = state.search_queries.clone();
    let mut new_urls = 0usize;

    for (i, query) in queries.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(delay).await;
        }
        tracing::info!(query = %query, "running search");

        let hits = match search.search(query).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(query = %query, "search failed, treating as zero results: {e:#}");
                continue;
            }
        };

        for hit in hits {
            if !is_valid_absolute_url(&hit.url) {
                tracing::debug!(url = %hit.url, "dropping non-absolute search hit");
                continue;
            }
            if state.push_url(hit.url) {
                new_urls += 1;
            }
        }
    }

    tracing::info!(
        total = state.discovered_urls().len(),
        new = new_urls,
        "discovery complete"
    );
    new_urls
}

fn is_valid_absolute_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
