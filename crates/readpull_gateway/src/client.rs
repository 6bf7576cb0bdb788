use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use client_logging::client_debug;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::types::{
    Ack, ApiFailure, Article, ArticlesResponse, DebugScreenshotsResponse, FailureKind, JobStatus,
    ScrapeRequest, ScrapeResponse, TempKeyResponse,
};

/// Header carrying the bearer credential.
pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Pagination and filtering for the catalog listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub limit: u32,
    pub offset: u32,
    pub search: Option<String>,
    pub site_source: Option<String>,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            search: None,
            site_source: None,
        }
    }
}

/// The remote operations the client consumes. One implementation talks HTTP;
/// tests may substitute their own.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn temp_key(&self) -> Result<String, ApiFailure>;
    async fn scrape(
        &self,
        credential: &str,
        request: &ScrapeRequest,
    ) -> Result<ScrapeResponse, ApiFailure>;
    async fn job_status(&self, credential: &str, job_id: &str) -> Result<JobStatus, ApiFailure>;
    async fn article(&self, credential: &str, article_id: &str) -> Result<Article, ApiFailure>;
    async fn download_pdf(&self, credential: &str, article_id: &str) -> Result<Bytes, ApiFailure>;
    async fn articles(
        &self,
        credential: Option<&str>,
        query: &PageQuery,
    ) -> Result<ArticlesResponse, ApiFailure>;
    async fn reject_job(&self, credential: &str, job_id: &str) -> Result<Ack, ApiFailure>;
    async fn cancel_job(&self, credential: &str, job_id: &str) -> Result<Ack, ApiFailure>;
    async fn debug_screenshots(
        &self,
        credential: &str,
    ) -> Result<DebugScreenshotsResponse, ApiFailure>;
}

#[derive(Debug, Clone)]
pub struct ReqwestGateway {
    base_url: Url,
    client: reqwest::Client,
}

impl ReqwestGateway {
    pub fn new(base_url: &str, settings: GatewaySettings) -> Result<Self, ApiFailure> {
        let base_url = Url::parse(base_url)
            .map_err(|err| ApiFailure::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiFailure::new(FailureKind::Transport, err.to_string()))?;
        Ok(Self { base_url, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiFailure> {
        self.base_url
            .join(path)
            .map_err(|err| ApiFailure::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiFailure> {
        let status = response.status();
        if !status.is_success() {
            return Err(failure_from_status(status, response.text().await.ok()));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| ApiFailure::new(FailureKind::Protocol, err.to_string()))
    }
}

#[async_trait]
impl Gateway for ReqwestGateway {
    async fn temp_key(&self) -> Result<String, ApiFailure> {
        let response = self
            .client
            .get(self.endpoint("/api/v1/get-temp-key")?)
            .send()
            .await
            .map_err(map_transport_error)?;
        let body: TempKeyResponse = Self::read_json(response).await?;
        Ok(body.api_key)
    }

    async fn scrape(
        &self,
        credential: &str,
        request: &ScrapeRequest,
    ) -> Result<ScrapeResponse, ApiFailure> {
        let response = self
            .client
            .post(self.endpoint("/api/v1/scrape")?)
            .header(API_KEY_HEADER, credential)
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read_json(response).await
    }

    async fn job_status(&self, credential: &str, job_id: &str) -> Result<JobStatus, ApiFailure> {
        let response = self
            .client
            .get(self.endpoint(&format!("/api/v1/job/{job_id}"))?)
            .header(API_KEY_HEADER, credential)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read_json(response).await
    }

    async fn article(&self, credential: &str, article_id: &str) -> Result<Article, ApiFailure> {
        let response = self
            .client
            .get(self.endpoint(&format!("/api/v1/article/{article_id}"))?)
            .header(API_KEY_HEADER, credential)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read_json(response).await
    }

    async fn download_pdf(&self, credential: &str, article_id: &str) -> Result<Bytes, ApiFailure> {
        let response = self
            .client
            .get(self.endpoint(&format!("/api/v1/article/{article_id}/pdf"))?)
            .header(API_KEY_HEADER, credential)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiFailure::new(
                FailureKind::NotFound,
                "PDF not generated yet",
            ));
        }
        if !status.is_success() {
            return Err(failure_from_status(status, response.text().await.ok()));
        }

        let bytes = response.bytes().await.map_err(map_transport_error)?;
        // Some backends report success with nothing attached; treat that the
        // same as a missing document, not as a valid download.
        if bytes.is_empty() {
            return Err(ApiFailure::new(FailureKind::EmptyBody, "empty PDF payload"));
        }
        Ok(bytes)
    }

    async fn articles(
        &self,
        credential: Option<&str>,
        query: &PageQuery,
    ) -> Result<ArticlesResponse, ApiFailure> {
        let mut url = self.endpoint("/api/v1/articles")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &query.limit.to_string());
            pairs.append_pair("offset", &query.offset.to_string());
            if let Some(search) = &query.search {
                pairs.append_pair("search", search);
            }
            if let Some(site_source) = &query.site_source {
                pairs.append_pair("site_source", site_source);
            }
        }

        let mut request = self.client.get(url);
        if let Some(credential) = credential {
            request = request.header(API_KEY_HEADER, credential);
        }
        let response = request.send().await.map_err(map_transport_error)?;
        Self::read_json(response).await
    }

    async fn reject_job(&self, credential: &str, job_id: &str) -> Result<Ack, ApiFailure> {
        let response = self
            .client
            .post(self.endpoint(&format!("/api/v1/job/{job_id}/reject"))?)
            .header(API_KEY_HEADER, credential)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read_json(response).await
    }

    async fn cancel_job(&self, credential: &str, job_id: &str) -> Result<Ack, ApiFailure> {
        let response = self
            .client
            .post(self.endpoint(&format!("/api/v1/job/{job_id}/cancel"))?)
            .header(API_KEY_HEADER, credential)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read_json(response).await
    }

    async fn debug_screenshots(
        &self,
        credential: &str,
    ) -> Result<DebugScreenshotsResponse, ApiFailure> {
        let response = self
            .client
            .get(self.endpoint("/api/v1/debug/screenshots")?)
            .header(API_KEY_HEADER, credential)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read_json(response).await
    }
}

fn map_transport_error(err: reqwest::Error) -> ApiFailure {
    client_debug!("transport error: {}", err);
    if err.is_timeout() {
        return ApiFailure::new(FailureKind::Timeout, err.to_string());
    }
    ApiFailure::new(FailureKind::Transport, err.to_string())
}

/// Builds the failure for a non-2xx response, folding in whatever the server
/// said. JSON error bodies contribute their `detail`/`message` field.
fn failure_from_status(status: StatusCode, body: Option<String>) -> ApiFailure {
    let kind = if status == StatusCode::NOT_FOUND {
        FailureKind::NotFound
    } else {
        FailureKind::HttpStatus(status.as_u16())
    };
    let message = match body.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
        Some(body) => format!("HTTP {} - {}", status.as_u16(), server_detail(body)),
        None => format!("HTTP {}", status.as_u16()),
    };
    client_debug!("request failed: {}", message);
    ApiFailure { kind, message }
}

fn server_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["detail", "message", "error"] {
            if let Some(text) = value.get(field).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    body.to_string()
}
