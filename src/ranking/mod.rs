//! Ranking & filtering engine: combines per-job signals into one weighted
//! score, applies the role-relevance penalty and minimum-score filter, and
//! keeps the top-K by bounded min-heap.

pub mod location;
pub mod profile;
pub mod signals;

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::cmp::Reverse;

use crate::models::job::Job;
use crate::providers::{EmbeddingProvider, Geocoder};
use location::{GeocodeCache, haversine_km};
use profile::{parse_profile, preprocess_text};
use signals::{cosine_similarity, experience_match, proximity_score, skill_overlap};

/// Relative weight of each signal in the combined score. Defaults sum to 1.0.
#[derive(Debug, Clone)]
pub struct RankWeights {
    pub resume_match: f64,
    pub prompt_match: f64,
    pub skill_overlap: f64,
    pub experience_match: f64,
    pub proximity: f64,
}

impl Default for RankWeights {
    fn default() -> Self {
        RankWeights {
            resume_match: 0.4,
            prompt_match: 0.2,
            skill_overlap: 0.2,
            experience_match: 0.1,
            proximity: 0.1,
        }
    }
}

/// Tunable parameters of the ranking engine.
#[derive(Debug, Clone)]
pub struct RankParams {
    pub top_k: usize,
    pub min_score: f64,
    pub weights: RankWeights,
    /// Prompt-title similarity above this earns the multiplicative boost.
    pub prompt_boost_threshold: f64,
    pub prompt_boost_factor: f64,
    /// Title similarity below this triggers the role-relevance penalty.
    pub role_relevance_threshold: f64,
    pub role_relevance_factor: f64,
    pub proximity_decay: f64,
    /// Candidate home location, geocoded once per rank call.
    pub candidate_location: Option<String>,
}

impl Default for RankParams {
    fn default() -> Self {
        RankParams {
            top_k: 100,
            min_score: 0.1,
            weights: RankWeights::default(),
            prompt_boost_threshold: 0.5,
            prompt_boost_factor: 1.2,
            role_relevance_threshold: 0.3,
            role_relevance_factor: 0.5,
            proximity_decay: 0.2,
            candidate_location: None,
        }
    }
}

/// Injected collaborators of the ranking engine.
pub struct RankingDeps<'a> {
    pub embedder: &'a dyn EmbeddingProvider,
    pub geocoder: &'a dyn Geocoder,
    pub geocode_cache: &'a GeocodeCache,
}

struct RankedEntry {
    score: f64,
    index: usize,
    job: Job,
}

impl PartialEq for RankedEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedEntry {}

impl PartialOrd for RankedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankedEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Embed text, degrading to a zero vector (cosine 0 against everything)
/// when the provider is unavailable.
async fn encode_or_zero(embedder: &dyn EmbeddingProvider, text: &str) -> Vec<f32> {
    match embedder.encode(text).await {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("embedding failed, degrading to zero vector: {e:#}");
            Vec::new()
        }
    }
}

/// Rank jobs against the resume and search prompt.
///
/// Returns at most `params.top_k` jobs with `score` populated, sorted by
/// non-increasing score, ties stable by input order. Pure function of its
/// inputs given a deterministic embedder: re-ranking an unchanged list
/// yields identical scores.
pub async fn rank_and_filter(
    jobs: Vec<Job>,
    resume_text: &str,
    search_prompt: &str,
    deps: &RankingDeps<'_>,
    params: &RankParams,
) -> Vec<Job> {
    if jobs.is_empty() {
        return Vec::new();
    }

    let resume_profile = parse_profile(resume_text);
    let resume_embedding = encode_or_zero(deps.embedder, &resume_profile.normalized_text).await;

    // An absent prompt degrades prompt similarity to 0 rather than erroring.
    let prompt_normalized = preprocess_text(search_prompt);
    let prompt_embedding = if prompt_normalized.is_empty() {
        None
    } else {
        Some(encode_or_zero(deps.embedder, &prompt_normalized).await)
    };

    let candidate_coords = match &params.candidate_location {
        Some(location) => deps.geocode_cache.resolve(deps.geocoder, location).await,
        None => None,
    };

    let mut heap: BinaryHeap<Reverse<RankedEntry>> = BinaryHeap::with_capacity(params.top_k + 1);

    for (index, mut job) in jobs.into_iter().enumerate() {
        if job.description.trim().is_empty() {
            tracing::debug!(title = %job.title, "skipping job without description");
            continue;
        }

        let job_profile = parse_profile(&job.description);

        if job.description_embedding.is_none() {
            job.description_embedding =
                Some(encode_or_zero(deps.embedder, &job_profile.normalized_text).await);
        }
        if job.title_embedding.is_none() {
            job.title_embedding =
                Some(encode_or_zero(deps.embedder, &preprocess_text(&job.title)).await);
        }
        let description_embedding = job.description_embedding.as_deref().unwrap_or_default();
        let title_embedding = job.title_embedding.as_deref().unwrap_or_default();

        let resume_similarity = cosine_similarity(&resume_embedding, description_embedding);

        let mut prompt_similarity = match &prompt_embedding {
            Some(prompt) => cosine_similarity(prompt, title_embedding),
            None => 0.0,
        };
        // Non-linear reward for strong prompt-title alignment.
        if prompt_similarity > params.prompt_boost_threshold {
            prompt_similarity = (prompt_similarity * params.prompt_boost_factor).min(1.0);
        }

        let overlap = skill_overlap(&resume_profile.skills, &job_profile.skills);
        let exp_match = experience_match(
            resume_profile.experience_level,
            job_profile.experience_level,
        );

        let job_coords = match &job.location {
            Some(location) => deps.geocode_cache.resolve(deps.geocoder, location).await,
            None => None,
        };
        let distance_km = match (candidate_coords, job_coords) {
            (Some(a), Some(b)) => Some(haversine_km(a, b)),
            _ => None,
        };
        let proximity = proximity_score(distance_km, params.proximity_decay);

        let w = &params.weights;
        let mut score = w.resume_match * resume_similarity
            + w.prompt_match * prompt_similarity
            + w.skill_overlap * overlap
            + w.experience_match * exp_match
            + w.proximity * proximity;

        // Role-relevance penalty: titles that drift from the stated intent
        // shrink the score even when the body text matches well.
        if prompt_embedding.is_some() {
            let title_prompt = cosine_similarity(
                prompt_embedding.as_deref().unwrap_or_default(),
                title_embedding,
            );
            score *= role_relevance_multiplier(title_prompt, params);
        }
        let title_resume = cosine_similarity(&resume_embedding, title_embedding);
        score *= role_relevance_multiplier(title_resume, params);

        if score < params.min_score {
            tracing::debug!(title = %job.title, score, "dropped below minimum score");
            continue;
        }

        job.score = Some(score);
        let entry = RankedEntry { score, index, job };

        if heap.len() < params.top_k {
            heap.push(Reverse(entry));
        } else if let Some(Reverse(min)) = heap.peek() {
            // Replace the current minimum only on strictly greater score.
            if entry.score > min.score {
                heap.pop();
                heap.push(Reverse(entry));
            }
        }
    }

    let mut entries: Vec<RankedEntry> = heap.into_iter().map(|r| r.0).collect();
    entries.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
    entries.into_iter().map(|e| e.job).collect()
}

fn role_relevance_multiplier(title_similarity: f64, params: &RankParams) -> f64 {
    if title_similarity >= params.role_relevance_threshold {
        return 1.0;
    }
    (1.0 - (params.role_relevance_threshold - title_similarity) * params.role_relevance_factor)
        .max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_relevance_multiplier_bounds() {
        let params = RankParams::default();
        assert_eq!(role_relevance_multiplier(0.9, &params), 1.0);
        assert_eq!(role_relevance_multiplier(0.3, &params), 1.0);
        let penalized = role_relevance_multiplier(0.1, &params);
        assert!((penalized - 0.9).abs() < 1e-12);
        // Even a fully opposed title never drives the multiplier below zero.
        assert!(role_relevance_multiplier(-5.0, &params) >= 0.0);
    }
}
