use crate::state::{ArticleView, JobUpdate, SessionPhase};

/// Immutable projection of the session for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub input: String,
    pub has_credential: bool,
    pub base_url: String,
    pub job_id: Option<String>,
    pub job: Option<JobUpdate>,
    pub article: Option<ArticleView>,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub is_submitting: bool,
    pub is_polling: bool,
    pub catalog: CatalogView,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogView {
    pub articles: Vec<ArticleView>,
    pub total: u64,
    pub is_loading: bool,
    pub error: Option<String>,
}
