use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};

use client_logging::client_info;
use readpull_core::{update, ArticleQuery, Msg, SessionState, SessionView};
use readpull_gateway::Gateway;

use crate::effects::EffectRunner;
use crate::preferences::PreferenceStore;

/// Owns one scraping session: the state aggregate, effect execution, and the
/// message pump connecting them.
pub struct SessionDriver {
    state: SessionState,
    msg_rx: mpsc::Receiver<Msg>,
    runner: EffectRunner,
}

impl SessionDriver {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        store: PreferenceStore,
        pdf_dir: PathBuf,
    ) -> io::Result<Self> {
        let (msg_tx, msg_rx) = mpsc::channel();
        let prefs = store.load();
        let runner = EffectRunner::new(gateway, store, pdf_dir, msg_tx)?;
        let mut driver = Self {
            state: SessionState::new(),
            msg_rx,
            runner,
        };
        driver.apply(Msg::PreferencesLoaded {
            credential: prefs.credential,
            base_url: prefs.base_url,
        });
        Ok(driver)
    }

    /// Applies one message and executes whatever effects it produced.
    pub fn apply(&mut self, msg: Msg) -> SessionView {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        state.consume_dirty();
        let view = state.view();
        self.state = state;
        self.runner.run(effects);
        view
    }

    /// Drives a submit to a terminal phase and returns the final view.
    pub fn run_scrape(&mut self, input: &str) -> SessionView {
        self.apply(Msg::InputChanged(input.to_string()));
        let view = self.apply(Msg::ScrapeRequested);
        if view.error.is_some() && !view.is_submitting && !view.is_polling {
            // Input validation failed; nothing is in flight.
            return view;
        }
        self.pump_until(|view| {
            view.phase.is_terminal() && !view.is_submitting && !view.is_polling
        })
    }

    /// Loads one catalog page.
    pub fn run_articles(&mut self, query: ArticleQuery) -> SessionView {
        self.apply(Msg::ArticlesRequested(query));
        self.pump_until(|view| !view.catalog.is_loading)
    }

    /// Fetches an article by id and downloads its PDF.
    pub fn run_article_pdf(&mut self, article_id: &str) -> SessionView {
        self.apply(Msg::ArticleRequested(article_id.to_string()));
        let view = self.pump_until(|view| !view.is_submitting);
        if view.article.is_none() {
            return view;
        }
        self.apply(Msg::PdfRequested);
        self.pump_until(|view| !view.is_submitting)
    }

    /// Obtains and persists a fresh temporary credential.
    pub fn run_temp_key(&mut self) -> SessionView {
        self.apply(Msg::CredentialRequested);
        self.pump_until(|view| !view.is_submitting)
    }

    fn pump_until(&mut self, done: impl Fn(&SessionView) -> bool) -> SessionView {
        let mut view = self.state.view();
        while !done(&view) {
            let msg = match self.msg_rx.recv() {
                Ok(msg) => msg,
                Err(_) => break,
            };
            let next = self.apply(msg);
            if next.job != view.job {
                if let Some(job) = &next.job {
                    client_info!(
                        "job update: {:?} step={:?}",
                        job.phase,
                        job.current_step.as_deref()
                    );
                }
            }
            view = next;
        }
        view
    }
}
