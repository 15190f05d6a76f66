use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::models::classification::{ClassifyMode, PageClassification};
use crate::models::job::Job;
use crate::providers::{EmbeddingProvider, JobExtractor, PageClassifier, QueryCrafter};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Text handed to the classifier; the first chunk is enough to tell a job
/// description from a board or an unrelated page.
const CLASSIFY_TEXT_CHARS: usize = 10_000;

/// Google Generative Language API client backing the LLM-shaped contracts:
/// query crafting, page classification, job extraction, and embeddings.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    embed_model: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_models(
            api_key,
            "gemini-2.0-flash-lite".to_string(),
            "text-embedding-004".to_string(),
        )
    }

    pub fn with_models(api_key: String, model: String, embed_model: String) -> Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing Gemini API key");
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build Gemini HTTP client")?;
        Ok(GeminiClient {
            client,
            api_key,
            model,
            embed_model,
        })
    }

    /// Run one structured-output generation and decode the JSON reply.
    async fn generate_json<T: DeserializeOwned>(&self, system: &str, user: &str) -> Result<T> {
        let url = format!(
            "{BASE_URL}/models/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let body = json!({
            "system_instruction": { "parts": [{ "text": system }] },
            "contents": [{ "role": "user", "parts": [{ "text": user }] }],
            "generationConfig": {
                "temperature": 0.2,
                "responseMimeType": "application/json"
            }
        });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Gemini returned {status}");
        }

        let reply: GenerateResponse = resp
            .json()
            .await
            .context("failed to parse Gemini response envelope")?;
        let text = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .context("Gemini response contained no candidate text")?;

        serde_json::from_str(&text).context("Gemini reply was not the requested JSON shape")
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct SearchQueries {
    queries: Vec<String>,
}

#[async_trait]
impl QueryCrafter for GeminiClient {
    async fn craft_queries(&self, resume_text: &str, search_prompt: &str) -> Result<Vec<String>> {
        let system = "You are an expert at crafting web search engine queries to find job \
            postings. Generate 1 to 3 queries for the user below. Keep each query vague but \
            relevant to the user's industry; a good example is 'software engineering \
            internships'. Reply with JSON: {\"queries\": [\"...\"]}";
        let user = format!(
            "Here is my resume:\n<resume>\n{resume_text}\n</resume>\n\n\
             Here is my search prompt:\n<prompt>\n{search_prompt}\n</prompt>"
        );
        let result: SearchQueries = self.generate_json(system, &user).await?;
        let queries: Vec<String> = result
            .queries
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .collect();
        anyhow::ensure!(!queries.is_empty(), "query crafting produced no queries");
        Ok(queries)
    }
}

#[derive(Debug, Deserialize)]
struct ClassificationReply {
    classification: PageClassification,
}

#[async_trait]
impl PageClassifier for GeminiClient {
    async fn classify(&self, page_text: &str, mode: ClassifyMode) -> Result<PageClassification> {
        let system = match mode {
            ClassifyMode::Broad => {
                "You classify web page content. Decide whether the page is a single job \
                 description, a list of jobs, or neither.\n\
                 - JOB_DESCRIPTION: details like 'Responsibilities', 'Qualifications', \
                 'About the Role' for one specific job.\n\
                 - JOB_BOARD: a list of multiple job titles, often with links to details.\n\
                 - IRRELEVANT: anything else, such as a company homepage, a blog article, \
                 or an error page.\n\
                 Reply with JSON: {\"classification\": \"JOB_DESCRIPTION\" | \"JOB_BOARD\" | \
                 \"IRRELEVANT\"}"
            }
            ClassifyMode::Strict => {
                "You classify web page content. Decide whether the page is a single job \
                 description or not.\n\
                 - JOB_DESCRIPTION: details for one specific job.\n\
                 - IRRELEVANT: anything else, including pages that merely list jobs.\n\
                 Reply with JSON: {\"classification\": \"JOB_DESCRIPTION\" | \"IRRELEVANT\"}"
            }
        };

        let excerpt: String = page_text.chars().take(CLASSIFY_TEXT_CHARS).collect();
        let user = format!("Classify the following page content:\n\n<content>\n{excerpt}\n</content>");
        let reply: ClassificationReply = self.generate_json(system, &user).await?;

        Ok(reply.classification.constrain(mode))
    }
}

#[derive(Debug, Deserialize)]
struct ExtractedJob {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    application_url: Option<String>,
    #[serde(default)]
    date_posted: Option<String>,
}

#[async_trait]
impl JobExtractor for GeminiClient {
    async fn extract(&self, page_text: &str) -> Result<Option<Job>> {
        let system = "You are an expert data extraction agent. Extract the job posting from \
            the provided page text into JSON with the fields: title, company, location, \
            description, application_url, date_posted (ISO 8601). Pay close attention to \
            finding the direct application URL. Use null for any field not present. Do not \
            invent information. If the page contains no job posting, reply with \
            {\"title\": null}.";
        let user = format!("Page Text:\n\n{page_text}");
        let extracted: ExtractedJob = self.generate_json(system, &user).await?;

        let Some(title) = extracted.title.filter(|t| !t.trim().is_empty()) else {
            return Ok(None);
        };
        let Some(description) = extracted.description.filter(|d| !d.trim().is_empty()) else {
            return Ok(None);
        };

        Ok(Some(Job {
            title,
            company: extracted.company.unwrap_or_else(|| "Unknown".to_string()),
            location: extracted.location,
            description,
            application_url: extracted.application_url,
            date_posted: extracted.date_posted.as_deref().and_then(parse_date),
            ..Default::default()
        }))
    }
}

/// Lenient date parsing for extractor output: RFC 3339 first, then a bare date.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!(
            "{BASE_URL}/models/{}:embedContent?key={}",
            self.embed_model, self.api_key
        );
        let body = json!({
            "content": { "parts": [{ "text": text }] }
        });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Gemini embedding request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Gemini embedding endpoint returned {status}");
        }

        let reply: EmbedResponse = resp
            .json()
            .await
            .context("failed to parse Gemini embedding response")?;
        Ok(reply.embedding.values)
    }
}
