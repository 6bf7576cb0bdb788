use url::Url;

use crate::{Effect, JobPhase, JobUpdate, Msg, PdfFailure, ScrapePayload, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: SessionState, msg: Msg) -> (SessionState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::PreferencesLoaded {
            credential,
            base_url,
        } => {
            state.apply_preferences(credential, base_url);
            Vec::new()
        }
        Msg::ScrapeRequested => submit(&mut state),
        Msg::RetryRequested => {
            state.clear_error();
            submit(&mut state)
        }
        Msg::CredentialRequested => {
            state.begin_request();
            vec![Effect::FetchCredential]
        }
        Msg::CredentialFetched(Ok(key)) => {
            state.store_credential(key.clone());
            vec![Effect::PersistCredential(key)]
        }
        Msg::CredentialFetched(Err(message)) => {
            state.fail(message);
            Vec::new()
        }
        Msg::SubmitRetryElapsed => {
            state.clear_submit_retry();
            if state.credential().is_some() {
                submit(&mut state)
            } else {
                state.settle_missing_credential();
                Vec::new()
            }
        }
        Msg::SubmitResolved(result) => submit_resolved(&mut state, result),
        Msg::PollTick => poll_tick(&mut state),
        Msg::PollResolved(result) => poll_resolved(&mut state, result),
        Msg::ArticleResolved(Ok(article)) => {
            state.resolve(article);
            Vec::new()
        }
        Msg::ArticleResolved(Err(message)) => {
            state.fail(message);
            Vec::new()
        }
        Msg::ArticleRequested(article_id) => match state.credential() {
            Some(credential) => {
                state.begin_request();
                vec![Effect::FetchArticle {
                    credential,
                    article_id,
                }]
            }
            None => {
                state.set_error("no credential available".to_string());
                Vec::new()
            }
        },
        Msg::CancelRequested => cancel(&mut state),
        Msg::CancelResolved(Ok(())) => {
            // A late acknowledgement must not touch a newly started submit.
            if !state.is_submitting() && !state.is_polling() {
                state.clear_job();
                state.mark_cancelled("job cancelled");
            }
            Vec::new()
        }
        Msg::CancelResolved(Err(message)) => {
            // The local loop stays stopped; only the message surfaces.
            state.finish_request_with_error(message);
            Vec::new()
        }
        Msg::RejectRequested => match (state.job_id(), state.credential()) {
            (Some(job_id), Some(credential)) => {
                state.begin_request();
                vec![Effect::RejectJob { credential, job_id }]
            }
            _ => Vec::new(),
        },
        Msg::RejectResolved(Ok(())) => {
            state.discard_article();
            Vec::new()
        }
        Msg::RejectResolved(Err(message)) => {
            state.finish_request_with_error(message);
            Vec::new()
        }
        Msg::PdfRequested => match (state.article_id(), state.credential()) {
            (Some(article_id), Some(credential)) => {
                state.begin_request();
                vec![Effect::DownloadPdf {
                    credential,
                    article_id,
                }]
            }
            _ => Vec::new(),
        },
        Msg::PdfResolved(Ok(receipt)) => {
            state.note_pdf(receipt);
            Vec::new()
        }
        Msg::PdfResolved(Err(failure)) => {
            let message = match failure {
                PdfFailure::NotGenerated => "the PDF has not been generated yet".to_string(),
                PdfFailure::Other(message) => message,
            };
            state.finish_request_with_error(message);
            Vec::new()
        }
        Msg::SaveCredential(key) => {
            state.store_credential(key.clone());
            vec![Effect::PersistCredential(key)]
        }
        Msg::SaveBaseUrl(url) => {
            state.set_base_url(url.clone());
            vec![Effect::PersistBaseUrl(url)]
        }
        Msg::ArticlesRequested(query) => {
            state.begin_catalog();
            vec![Effect::FetchArticles {
                credential: state.credential(),
                query,
            }]
        }
        Msg::ArticlesResolved(Ok(page)) => {
            state.finish_catalog(page);
            Vec::new()
        }
        Msg::ArticlesResolved(Err(message)) => {
            state.fail_catalog(message);
            Vec::new()
        }
    };

    (state, effects)
}

fn submit(state: &mut SessionState) -> Vec<Effect> {
    // A submit while a job is in flight acts as a cancel request.
    if state.is_polling() && state.job_id().is_some() {
        return cancel(state);
    }

    let input = state.input().trim().to_string();
    if input.is_empty() {
        state.set_error("enter a URL or search terms first".to_string());
        return Vec::new();
    }

    let Some(credential) = state.credential() else {
        // Warm up a temporary credential, then re-deliver the submit once.
        // Best effort: a slow warm-up loses the race and the retry gives up.
        if state.arm_submit_retry() {
            state.begin_request();
            return vec![Effect::FetchCredential, Effect::ScheduleSubmitRetry];
        }
        return Vec::new();
    };

    if state.is_submitting() || state.is_polling() {
        return Vec::new();
    }

    state.begin_submit();
    vec![Effect::SubmitScrape {
        credential,
        payload: classify_input(&input),
    }]
}

fn submit_resolved(
    state: &mut SessionState,
    result: Result<crate::SubmitOutcome, String>,
) -> Vec<Effect> {
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(message) => {
            state.fail(message);
            return Vec::new();
        }
    };

    if outcome.cached {
        if let Some(article_id) = outcome.article_id {
            // Keep the job id so a cached article can still be rejected.
            state.note_job(outcome.job_id);
            let Some(credential) = state.credential() else {
                state.settle_missing_credential();
                return Vec::new();
            };
            return vec![Effect::FetchArticle {
                credential,
                article_id,
            }];
        }
    }

    if let Some(job_id) = outcome.job_id {
        state.begin_polling(job_id);
        return vec![Effect::StartPolling];
    }

    state.fail("unexpected server response".to_string());
    Vec::new()
}

fn poll_tick(state: &mut SessionState) -> Vec<Effect> {
    if !state.is_polling() {
        return Vec::new();
    }
    // One status request at a time; a slow response just skips ticks.
    if state.poll_in_flight() {
        return Vec::new();
    }
    let Some(job_id) = state.job_id() else {
        state.halt_polling();
        return vec![Effect::StopPolling];
    };
    match state.credential() {
        Some(credential) => {
            state.mark_poll_in_flight();
            vec![Effect::FetchJobStatus { credential, job_id }]
        }
        // Credential vanished mid-loop: stop quietly, no error.
        None => {
            state.halt_polling();
            vec![Effect::StopPolling]
        }
    }
}

fn poll_resolved(state: &mut SessionState, result: Result<JobUpdate, String>) -> Vec<Effect> {
    state.clear_poll_in_flight();
    if !state.is_polling() {
        // A response that raced a local cancel; the loop is already gone.
        return Vec::new();
    }

    let snapshot = match result {
        Ok(snapshot) => snapshot,
        Err(message) => {
            // First poll error ends the session; no retries, no backoff.
            state.halt_polling();
            state.fail(message);
            return vec![Effect::StopPolling];
        }
    };

    let phase = snapshot.phase.clone();
    let article_id = snapshot.article_id.clone();
    let error_message = snapshot.error_message.clone();
    // Every successful poll refreshes the visible snapshot, terminal or not.
    state.record_job_snapshot(snapshot);

    match phase {
        JobPhase::Completed => {
            state.halt_polling();
            let mut effects = vec![Effect::StopPolling];
            match (article_id, state.credential()) {
                (Some(article_id), Some(credential)) => {
                    state.begin_request();
                    effects.push(Effect::FetchArticle {
                        credential,
                        article_id,
                    });
                }
                (Some(_), None) => {}
                (None, _) => {
                    state.fail("job completed but no article was produced".to_string());
                }
            }
            effects
        }
        JobPhase::Failed => {
            state.halt_polling();
            state.fail(error_message.unwrap_or_else(|| "the scrape job failed".to_string()));
            vec![Effect::StopPolling]
        }
        JobPhase::Cancelled => {
            state.halt_polling();
            state.mark_cancelled("job cancelled");
            vec![Effect::StopPolling]
        }
        JobPhase::Other(_) => Vec::new(),
    }
}

fn cancel(state: &mut SessionState) -> Vec<Effect> {
    // The local loop stops unconditionally, before the remote call goes out.
    state.halt_polling();
    let mut effects = vec![Effect::StopPolling];
    if let (Some(job_id), Some(credential)) = (state.job_id(), state.credential()) {
        state.mark_cancelled("cancellation requested");
        effects.push(Effect::CancelJob { credential, job_id });
    }
    effects
}

fn classify_input(input: &str) -> ScrapePayload {
    match Url::parse(input) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            ScrapePayload::Url(input.to_string())
        }
        _ => ScrapePayload::Terms(input.to_string()),
    }
}
