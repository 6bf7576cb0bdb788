//! Readpull gateway: typed HTTP client for the remote scraping service.
mod client;
mod types;

pub use client::{Gateway, GatewaySettings, PageQuery, ReqwestGateway, API_KEY_HEADER};
pub use types::{
    Ack, ApiFailure, Article, ArticlesResponse, DebugScreenshot, DebugScreenshotsResponse,
    FailureKind, JobStatus, ScrapeRequest, ScrapeResponse,
};
