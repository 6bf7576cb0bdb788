use crate::msg::PdfReceipt;
use crate::view_model::{CatalogView, SessionView};

/// Built-in backend address, used until the user configures another one.
pub const DEFAULT_BASE_URL: &str = "http://104.244.74.191";

/// Lifecycle of the session as observed by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Submitting,
    Polling,
    Resolved,
    Failed,
    Cancelled,
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionPhase::Resolved | SessionPhase::Failed | SessionPhase::Cancelled
        )
    }
}

/// Server-side job status tag, parsed once at the edge. The tag set is
/// open-ended; anything unrecognized keeps the poll loop running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPhase {
    Completed,
    Failed,
    Cancelled,
    Other(String),
}

impl JobPhase {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "completed" => JobPhase::Completed,
            "failed" => JobPhase::Failed,
            "cancelled" => JobPhase::Cancelled,
            other => JobPhase::Other(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobPhase::Other(_))
    }
}

/// One poll snapshot of the tracked job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobUpdate {
    pub phase: JobPhase,
    pub current_step: Option<String>,
    pub step_description: Option<String>,
    pub search_results_count: Option<u32>,
    pub article_id: Option<String>,
    pub error_message: Option<String>,
}

/// A scraped article as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleView {
    pub id: String,
    pub url: String,
    pub title: String,
    pub html_content: Option<String>,
    pub pdf_path: Option<String>,
    pub site_source: Option<String>,
    pub created_at: String,
    pub scraped_at: Option<String>,
}

/// One page of the article catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticlePage {
    pub articles: Vec<ArticleView>,
    pub total: u64,
}

/// Pagination and filtering for the catalog listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleQuery {
    pub limit: u32,
    pub offset: u32,
    pub search: Option<String>,
    pub site_source: Option<String>,
}

impl Default for ArticleQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            search: None,
            site_source: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct CatalogState {
    articles: Vec<ArticleView>,
    total: u64,
    is_loading: bool,
    error: Option<String>,
}

/// The single mutable aggregate the UI observes. Owned by the driver; all
/// mutation goes through `update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    phase: SessionPhase,
    input: String,
    credential: Option<String>,
    base_url: String,
    job_id: Option<String>,
    job: Option<JobUpdate>,
    article: Option<ArticleView>,
    error: Option<String>,
    notice: Option<String>,
    is_submitting: bool,
    is_polling: bool,
    poll_in_flight: bool,
    retry_scheduled: bool,
    catalog: CatalogState,
    dirty: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Idle,
            input: String::new(),
            credential: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            job_id: None,
            job: None,
            article: None,
            error: None,
            notice: None,
            is_submitting: false,
            is_polling: false,
            poll_in_flight: false,
            retry_scheduled: false,
            catalog: CatalogState::default(),
            dirty: false,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase,
            input: self.input.clone(),
            has_credential: self.credential.is_some(),
            base_url: self.base_url.clone(),
            job_id: self.job_id.clone(),
            job: self.job.clone(),
            article: self.article.clone(),
            error: self.error.clone(),
            notice: self.notice.clone(),
            is_submitting: self.is_submitting,
            is_polling: self.is_polling,
            catalog: CatalogView {
                articles: self.catalog.articles.clone(),
                total: self.catalog.total,
                is_loading: self.catalog.is_loading,
                error: self.catalog.error.clone(),
            },
        }
    }

    /// Returns whether the state changed since the last call, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        let was = self.dirty;
        self.dirty = false;
        was
    }

    // --- accessors used by `update` -------------------------------------

    pub(crate) fn input(&self) -> &str {
        &self.input
    }

    pub(crate) fn credential(&self) -> Option<String> {
        self.credential.clone()
    }

    pub(crate) fn job_id(&self) -> Option<String> {
        self.job_id.clone()
    }

    pub(crate) fn article_id(&self) -> Option<String> {
        self.article.as_ref().map(|article| article.id.clone())
    }

    pub(crate) fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub(crate) fn is_polling(&self) -> bool {
        self.is_polling
    }

    pub(crate) fn poll_in_flight(&self) -> bool {
        self.poll_in_flight
    }

    // --- mutators -------------------------------------------------------

    pub(crate) fn set_input(&mut self, text: String) {
        self.input = text;
        self.error = None;
        self.dirty = true;
    }

    pub(crate) fn apply_preferences(&mut self, credential: Option<String>, base_url: String) {
        self.credential = credential;
        self.base_url = base_url;
        self.dirty = true;
    }

    pub(crate) fn store_credential(&mut self, key: String) {
        self.credential = Some(key);
        self.is_submitting = false;
        self.retry_scheduled = false;
        self.dirty = true;
    }

    pub(crate) fn set_base_url(&mut self, url: String) {
        self.base_url = url;
        self.dirty = true;
    }

    pub(crate) fn set_error(&mut self, message: String) {
        self.error = Some(message);
        self.dirty = true;
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
        self.dirty = true;
    }

    /// Arms the one-shot credential warm-up retry. Returns false if a retry
    /// is already pending.
    pub(crate) fn arm_submit_retry(&mut self) -> bool {
        if self.retry_scheduled {
            return false;
        }
        self.retry_scheduled = true;
        true
    }

    pub(crate) fn clear_submit_retry(&mut self) {
        self.retry_scheduled = false;
    }

    /// Marks an in-flight remote request on behalf of the user.
    pub(crate) fn begin_request(&mut self) {
        self.is_submitting = true;
        self.error = None;
        self.notice = None;
        self.dirty = true;
    }

    pub(crate) fn begin_submit(&mut self) {
        self.begin_request();
        self.phase = SessionPhase::Submitting;
    }

    /// Surfaces a non-fatal request failure without leaving the session phase.
    pub(crate) fn finish_request_with_error(&mut self, message: String) {
        self.is_submitting = false;
        self.error = Some(message);
        self.dirty = true;
    }

    /// Terminal failure of the submit/poll flow.
    pub(crate) fn fail(&mut self, message: String) {
        self.phase = SessionPhase::Failed;
        self.error = Some(message);
        self.is_submitting = false;
        self.is_polling = false;
        self.dirty = true;
    }

    /// Gives up on a submit whose credential never arrived. Keeps an error
    /// already reported by the credential fetch.
    pub(crate) fn settle_missing_credential(&mut self) {
        self.phase = SessionPhase::Failed;
        self.is_submitting = false;
        if self.error.is_none() {
            self.error = Some("credential not available yet, try again".to_string());
        }
        self.dirty = true;
    }

    pub(crate) fn begin_polling(&mut self, job_id: String) {
        self.phase = SessionPhase::Polling;
        self.job_id = Some(job_id);
        self.is_submitting = false;
        self.is_polling = true;
        self.poll_in_flight = false;
        self.dirty = true;
    }

    /// Remembers the job id of a cached submit so the article can still be
    /// rejected later.
    pub(crate) fn note_job(&mut self, job_id: Option<String>) {
        self.job_id = job_id;
        self.dirty = true;
    }

    pub(crate) fn mark_poll_in_flight(&mut self) {
        self.poll_in_flight = true;
    }

    pub(crate) fn clear_poll_in_flight(&mut self) {
        self.poll_in_flight = false;
    }

    /// Stops the local loop without reporting anything.
    pub(crate) fn halt_polling(&mut self) {
        if self.is_polling {
            self.dirty = true;
        }
        self.is_polling = false;
        self.poll_in_flight = false;
    }

    pub(crate) fn record_job_snapshot(&mut self, snapshot: JobUpdate) {
        self.job = Some(snapshot);
        self.dirty = true;
    }

    pub(crate) fn resolve(&mut self, article: ArticleView) {
        self.phase = SessionPhase::Resolved;
        self.article = Some(article);
        self.error = None;
        self.is_submitting = false;
        self.is_polling = false;
        self.dirty = true;
    }

    pub(crate) fn mark_cancelled(&mut self, notice: &str) {
        self.phase = SessionPhase::Cancelled;
        self.notice = Some(notice.to_string());
        self.error = None;
        self.is_submitting = false;
        self.dirty = true;
    }

    pub(crate) fn clear_job(&mut self) {
        self.job_id = None;
        self.job = None;
        self.is_submitting = false;
        self.dirty = true;
    }

    /// Drops the displayed article after a successful reject. Job bookkeeping
    /// is left alone.
    pub(crate) fn discard_article(&mut self) {
        self.article = None;
        self.error = None;
        self.is_submitting = false;
        self.dirty = true;
    }

    pub(crate) fn note_pdf(&mut self, receipt: PdfReceipt) {
        self.is_submitting = false;
        self.notice = Some(format!(
            "PDF saved to {} ({} bytes)",
            receipt.path, receipt.bytes
        ));
        self.dirty = true;
    }

    pub(crate) fn begin_catalog(&mut self) {
        self.catalog.is_loading = true;
        self.catalog.error = None;
        self.dirty = true;
    }

    pub(crate) fn finish_catalog(&mut self, page: ArticlePage) {
        self.catalog.articles = page.articles;
        self.catalog.total = page.total;
        self.catalog.is_loading = false;
        self.dirty = true;
    }

    pub(crate) fn fail_catalog(&mut self, message: String) {
        self.catalog.is_loading = false;
        self.catalog.error = Some(message);
        self.dirty = true;
    }
}
