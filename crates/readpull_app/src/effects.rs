use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use client_logging::{client_debug, client_warn};
use readpull_core::{Effect, Msg, PdfFailure, PdfReceipt, ScrapePayload, SubmitOutcome};
use readpull_gateway::{Gateway, PageQuery, ScrapeRequest};
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;

use crate::mapping;
use crate::preferences::PreferenceStore;

/// Fixed cadence of the job-status loop.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);
/// How long a submit waits for the credential warm-up before its one retry.
pub const SUBMIT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Executes core effects against the gateway on a dedicated runtime and
/// feeds the results back as messages.
pub struct EffectRunner {
    runtime: tokio::runtime::Runtime,
    gateway: Arc<dyn Gateway>,
    store: PreferenceStore,
    pdf_dir: PathBuf,
    msg_tx: mpsc::Sender<Msg>,
    poll_guard: Mutex<Option<CancellationToken>>,
}

impl EffectRunner {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        store: PreferenceStore,
        pdf_dir: PathBuf,
        msg_tx: mpsc::Sender<Msg>,
    ) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            runtime,
            gateway,
            store,
            pdf_dir,
            msg_tx,
            poll_guard: Mutex::new(None),
        })
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.dispatch(effect);
        }
    }

    fn dispatch(&self, effect: Effect) {
        match effect {
            Effect::FetchCredential => {
                let gateway = self.gateway.clone();
                let tx = self.msg_tx.clone();
                self.runtime.spawn(async move {
                    let result = gateway.temp_key().await.map_err(|f| f.to_string());
                    let _ = tx.send(Msg::CredentialFetched(result));
                });
            }
            Effect::ScheduleSubmitRetry => {
                let tx = self.msg_tx.clone();
                self.runtime.spawn(async move {
                    tokio::time::sleep(SUBMIT_RETRY_DELAY).await;
                    let _ = tx.send(Msg::SubmitRetryElapsed);
                });
            }
            Effect::SubmitScrape {
                credential,
                payload,
            } => {
                let request = match payload {
                    ScrapePayload::Url(url) => ScrapeRequest::for_url(url),
                    ScrapePayload::Terms(terms) => ScrapeRequest::for_terms(terms),
                };
                let gateway = self.gateway.clone();
                let tx = self.msg_tx.clone();
                self.runtime.spawn(async move {
                    let result = gateway
                        .scrape(&credential, &request)
                        .await
                        .map(|response| SubmitOutcome {
                            job_id: response.job_id,
                            article_id: response.article_id,
                            cached: response.cached,
                        })
                        .map_err(|f| f.to_string());
                    let _ = tx.send(Msg::SubmitResolved(result));
                });
            }
            Effect::StartPolling => self.start_ticker(),
            Effect::StopPolling => self.stop_ticker(),
            Effect::FetchJobStatus { credential, job_id } => {
                let gateway = self.gateway.clone();
                let tx = self.msg_tx.clone();
                self.runtime.spawn(async move {
                    let result = gateway
                        .job_status(&credential, &job_id)
                        .await
                        .map(mapping::job_update)
                        .map_err(|f| f.to_string());
                    let _ = tx.send(Msg::PollResolved(result));
                });
            }
            Effect::FetchArticle {
                credential,
                article_id,
            } => {
                let gateway = self.gateway.clone();
                let tx = self.msg_tx.clone();
                self.runtime.spawn(async move {
                    let result = gateway
                        .article(&credential, &article_id)
                        .await
                        .map(mapping::article_view)
                        .map_err(|f| f.to_string());
                    let _ = tx.send(Msg::ArticleResolved(result));
                });
            }
            Effect::CancelJob { credential, job_id } => {
                let gateway = self.gateway.clone();
                let tx = self.msg_tx.clone();
                self.runtime.spawn(async move {
                    let result = gateway
                        .cancel_job(&credential, &job_id)
                        .await
                        .map(|_| ())
                        .map_err(|f| f.to_string());
                    let _ = tx.send(Msg::CancelResolved(result));
                });
            }
            Effect::RejectJob { credential, job_id } => {
                let gateway = self.gateway.clone();
                let tx = self.msg_tx.clone();
                self.runtime.spawn(async move {
                    let result = gateway
                        .reject_job(&credential, &job_id)
                        .await
                        .map(|_| ())
                        .map_err(|f| f.to_string());
                    let _ = tx.send(Msg::RejectResolved(result));
                });
            }
            Effect::DownloadPdf {
                credential,
                article_id,
            } => {
                let gateway = self.gateway.clone();
                let tx = self.msg_tx.clone();
                let dir = self.pdf_dir.clone();
                self.runtime.spawn(async move {
                    let result = match gateway.download_pdf(&credential, &article_id).await {
                        Ok(bytes) => save_pdf(&dir, &article_id, &bytes)
                            .map_err(|err| PdfFailure::Other(format!("failed to write PDF: {err}"))),
                        Err(failure) => Err(mapping::pdf_failure(failure)),
                    };
                    let _ = tx.send(Msg::PdfResolved(result));
                });
            }
            Effect::FetchArticles { credential, query } => {
                let query = PageQuery {
                    limit: query.limit,
                    offset: query.offset,
                    search: query.search,
                    site_source: query.site_source,
                };
                let gateway = self.gateway.clone();
                let tx = self.msg_tx.clone();
                self.runtime.spawn(async move {
                    let result = gateway
                        .articles(credential.as_deref(), &query)
                        .await
                        .map(mapping::article_page)
                        .map_err(|f| f.to_string());
                    let _ = tx.send(Msg::ArticlesResolved(result));
                });
            }
            Effect::PersistCredential(key) => {
                if let Err(err) = self.store.save_credential(&key) {
                    client_warn!("Failed to persist credential: {}", err);
                }
            }
            Effect::PersistBaseUrl(url) => {
                if let Err(err) = self.store.save_base_url(&url) {
                    client_warn!("Failed to persist base url: {}", err);
                }
            }
        }
    }

    /// Starts the poll ticker, replacing (and cancelling) any previous one.
    /// At most one ticker exists per runner.
    fn start_ticker(&self) {
        let token = CancellationToken::new();
        if let Some(previous) = self
            .poll_guard
            .lock()
            .expect("poll guard")
            .replace(token.clone())
        {
            previous.cancel();
        }
        let tx = self.msg_tx.clone();
        self.runtime.spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(POLL_INTERVAL) => {
                        if tx.send(Msg::PollTick).is_err() {
                            break;
                        }
                    }
                }
            }
        });
        client_debug!("poll ticker started");
    }

    fn stop_ticker(&self) {
        if let Some(token) = self.poll_guard.lock().expect("poll guard").take() {
            token.cancel();
            client_debug!("poll ticker stopped");
        }
    }
}

/// Writes PDF bytes next to the other downloads, temp-file-then-rename.
fn save_pdf(dir: &Path, article_id: &str, bytes: &[u8]) -> io::Result<PdfReceipt> {
    std::fs::create_dir_all(dir)?;
    let target = dir.join(format!("article_{article_id}.pdf"));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(&target).map_err(|err| err.error)?;
    Ok(PdfReceipt {
        path: target.display().to_string(),
        bytes: bytes.len() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_pdf_writes_the_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let receipt = save_pdf(dir.path(), "art-1", b"%PDF-1.7 data").unwrap();

        assert_eq!(receipt.bytes, 13);
        let written = std::fs::read(dir.path().join("article_art-1.pdf")).unwrap();
        assert_eq!(written, b"%PDF-1.7 data");
    }
}
