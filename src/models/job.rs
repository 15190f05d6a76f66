use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A structured job listing extracted from a fetched page.
///
/// Immutable once scored, except for the single `score` write performed by
/// the ranking engine. The embedding fields are populated lazily; a job that
/// never reaches ranking may carry neither.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Job {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub description: String,
    pub application_url: Option<String>,
    pub date_posted: Option<DateTime<Utc>>,
    /// URL the listing was fetched from. Written by the page processor,
    /// never taken from the extractor's output.
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_embedding: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_embedding: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}
