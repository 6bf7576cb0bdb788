use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized failure for every gateway operation. The kind is structured so
/// callers never have to sniff message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiFailure {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ApiFailure {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection-level failure before any HTTP response arrived.
    Transport,
    Timeout,
    InvalidUrl,
    /// Any non-2xx status other than the not-found case.
    HttpStatus(u16),
    /// 404: the resource does not exist (for PDFs: not generated yet).
    NotFound,
    /// A 2xx response whose payload was empty where content was required.
    EmptyBody,
    /// A 2xx response whose body did not match the expected shape.
    Protocol,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Transport => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::NotFound => write!(f, "not found"),
            FailureKind::EmptyBody => write!(f, "empty response"),
            FailureKind::Protocol => write!(f, "malformed response"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TempKeyResponse {
    pub api_key: String,
}

/// Submit body: exactly one of `url` or `search_terms` is populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_terms: Option<String>,
}

impl ScrapeRequest {
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn for_terms(terms: impl Into<String>) -> Self {
        Self {
            search_terms: Some(terms.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeResponse {
    #[serde(default)]
    pub job_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub search_terms: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub article_id: Option<String>,
    #[serde(default)]
    pub cached: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobStatus {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub current_step: Option<String>,
    #[serde(default)]
    pub step_description: Option<String>,
    #[serde(default)]
    pub search_terms: Option<String>,
    #[serde(default)]
    pub extracted_title: Option<String>,
    #[serde(default)]
    pub search_results_count: Option<u32>,
    #[serde(default)]
    pub best_match_title: Option<String>,
    #[serde(default)]
    pub best_match_percentage: Option<i32>,
    #[serde(default)]
    pub best_match_source: Option<String>,
    #[serde(default)]
    pub article_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Article {
    pub id: String,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub html_content: Option<String>,
    #[serde(default)]
    pub pdf_path: Option<String>,
    #[serde(default)]
    pub site_source: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub scraped_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArticlesResponse {
    pub articles: Vec<Article>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

/// Acknowledgement body for reject/cancel.
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DebugScreenshot {
    pub filename: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub job_id: String,
    pub timestamp: i64,
    pub datetime: String,
    pub size: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DebugScreenshotsResponse {
    pub screenshots: Vec<DebugScreenshot>,
    pub total: u64,
}
