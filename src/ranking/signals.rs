// Pure numeric scoring primitives. Nothing in this module suspends.

use std::collections::BTreeSet;

use crate::models::profile::ExperienceLevel;

/// Proximity score when either side's location is missing or ungeocodable.
pub const NEUTRAL_PROXIMITY: f64 = 0.3;

/// Cosine similarity of two vectors; 0.0 for empty, mismatched, or
/// zero-norm inputs (never divides by zero).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Exponential distance decay: 1.0 at zero distance, `NEUTRAL_PROXIMITY`
/// when the distance is unknown.
pub fn proximity_score(distance_km: Option<f64>, decay_factor: f64) -> f64 {
    match distance_km {
        Some(km) => (-decay_factor * km).exp().clamp(0.0, 1.0),
        None => NEUTRAL_PROXIMITY,
    }
}

/// Jaccard similarity of two skill sets, with the empty-union case defined
/// as zero overlap.
pub fn skill_overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Experience-tier agreement with logarithmic decay over the tier gap.
///
/// Both sides unspecified is a perfect match; exactly one unspecified is
/// neutral; otherwise `1 - log2(1+diff) / log2(1+MAX_TIER_SPAN)`, which
/// penalizes the first tier of mismatch hardest and then tapers.
pub fn experience_match(resume: ExperienceLevel, job: ExperienceLevel) -> f64 {
    match (resume.ordinal(), job.ordinal()) {
        (None, None) => 1.0,
        (None, Some(_)) | (Some(_), None) => 0.5,
        (Some(a), Some(b)) => {
            let diff = f64::from(a.abs_diff(b));
            let span = f64::from(ExperienceLevel::MAX_TIER_SPAN);
            1.0 - (1.0 + diff).log2() / (1.0 + span).log2()
        }
    }
}
