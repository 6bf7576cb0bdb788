use crate::state::{ArticlePage, ArticleQuery, ArticleView, JobUpdate};

/// Outcome of a submit call, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub job_id: Option<String>,
    pub article_id: Option<String>,
    pub cached: bool,
}

/// Where a downloaded PDF ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfReceipt {
    pub path: String,
    pub bytes: u64,
}

/// PDF downloads keep the "not generated yet" case apart from everything
/// else so the user gets a useful message instead of a generic error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfFailure {
    NotGenerated,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the URL/search input box.
    InputChanged(String),
    /// User submitted the current input for scraping.
    ScrapeRequested,
    /// User asked to retry after an error.
    RetryRequested,
    /// Stored preferences arrived at startup.
    PreferencesLoaded {
        credential: Option<String>,
        base_url: String,
    },
    /// User asked for a fresh temporary credential.
    CredentialRequested,
    /// Temp-credential call resolved.
    CredentialFetched(Result<String, String>),
    /// The deferred re-submit after a credential warm-up came due.
    SubmitRetryElapsed,
    /// Submit call resolved.
    SubmitResolved(Result<SubmitOutcome, String>),
    /// The poll ticker fired.
    PollTick,
    /// Job-status call resolved.
    PollResolved(Result<JobUpdate, String>),
    /// Article fetch resolved.
    ArticleResolved(Result<ArticleView, String>),
    /// User opened an article from the catalog.
    ArticleRequested(String),
    /// User cancelled the in-flight job.
    CancelRequested,
    /// Remote cancel call resolved.
    CancelResolved(Result<(), String>),
    /// User rejected the resolved article as a wrong match.
    RejectRequested,
    /// Remote reject call resolved.
    RejectResolved(Result<(), String>),
    /// User asked for the resolved article's PDF.
    PdfRequested,
    /// PDF download resolved.
    PdfResolved(Result<PdfReceipt, PdfFailure>),
    /// User saved a credential in settings.
    SaveCredential(String),
    /// User saved a backend address in settings.
    SaveBaseUrl(String),
    /// User requested a catalog page.
    ArticlesRequested(ArticleQuery),
    /// Catalog listing resolved.
    ArticlesResolved(Result<ArticlePage, String>),
}
