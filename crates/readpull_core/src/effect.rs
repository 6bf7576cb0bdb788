use crate::state::ArticleQuery;

/// How the submit input is framed on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapePayload {
    Url(String),
    Terms(String),
}

/// IO requested by `update`, executed by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchCredential,
    /// Re-deliver the submit once after a short fixed delay, giving the
    /// credential warm-up a chance to land first.
    ScheduleSubmitRetry,
    SubmitScrape {
        credential: String,
        payload: ScrapePayload,
    },
    StartPolling,
    StopPolling,
    FetchJobStatus {
        credential: String,
        job_id: String,
    },
    FetchArticle {
        credential: String,
        article_id: String,
    },
    CancelJob {
        credential: String,
        job_id: String,
    },
    RejectJob {
        credential: String,
        job_id: String,
    },
    DownloadPdf {
        credential: String,
        article_id: String,
    },
    FetchArticles {
        credential: Option<String>,
        query: ArticleQuery,
    },
    PersistCredential(String),
    PersistBaseUrl(String),
}
