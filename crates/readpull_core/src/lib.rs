//! Readpull core: pure session state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, ScrapePayload};
pub use msg::{Msg, PdfFailure, PdfReceipt, SubmitOutcome};
pub use state::{
    ArticlePage, ArticleQuery, ArticleView, JobPhase, JobUpdate, SessionPhase, SessionState,
    DEFAULT_BASE_URL,
};
pub use update::update;
pub use view_model::{CatalogView, SessionView};
