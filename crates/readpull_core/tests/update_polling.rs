use std::sync::Once;

use readpull_core::{
    update, Effect, JobPhase, JobUpdate, Msg, SessionPhase, SessionState, SubmitOutcome,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(client_logging::initialize_for_tests);
}

fn snapshot(tag: &str) -> JobUpdate {
    JobUpdate {
        phase: JobPhase::from_tag(tag),
        current_step: None,
        step_description: None,
        search_results_count: None,
        article_id: None,
        error_message: None,
    }
}

/// Drives a fresh session into `Polling` on job `job-1`.
fn polling_state() -> SessionState {
    let (state, _) = update(
        SessionState::new(),
        Msg::PreferencesLoaded {
            credential: Some("key-1".to_string()),
            base_url: "http://backend.test".to_string(),
        },
    );
    let (state, _) = update(state, Msg::InputChanged("https://example.com/a".to_string()));
    let (state, _) = update(state, Msg::ScrapeRequested);
    let (state, _) = update(
        state,
        Msg::SubmitResolved(Ok(SubmitOutcome {
            job_id: Some("job-1".to_string()),
            article_id: None,
            cached: false,
        })),
    );
    state
}

#[test]
fn tick_fetches_job_status() {
    init_logging();
    let (_state, effects) = update(polling_state(), Msg::PollTick);

    assert_eq!(
        effects,
        vec![Effect::FetchJobStatus {
            credential: "key-1".to_string(),
            job_id: "job-1".to_string(),
        }]
    );
}

#[test]
fn tick_skips_while_a_status_request_is_in_flight() {
    init_logging();
    let (state, _) = update(polling_state(), Msg::PollTick);
    let (_state, effects) = update(state, Msg::PollTick);

    assert!(effects.is_empty());
}

#[test]
fn intermediate_snapshot_is_exposed_without_leaving_polling() {
    init_logging();
    let mut searching = snapshot("searching");
    searching.search_results_count = Some(5);
    searching.current_step = Some("search".to_string());

    let (state, _) = update(polling_state(), Msg::PollTick);
    let (state, effects) = update(state, Msg::PollResolved(Ok(searching)));

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.phase, SessionPhase::Polling);
    assert!(view.is_polling);
    let job = view.job.expect("snapshot recorded");
    assert_eq!(job.search_results_count, Some(5));
    assert_eq!(job.current_step.as_deref(), Some("search"));
}

#[test]
fn completed_with_article_stops_polling_and_fetches_it() {
    init_logging();
    let mut done = snapshot("completed");
    done.article_id = Some("art-9".to_string());

    let (state, _) = update(polling_state(), Msg::PollTick);
    let (state, effects) = update(state, Msg::PollResolved(Ok(done)));

    assert_eq!(
        effects,
        vec![
            Effect::StopPolling,
            Effect::FetchArticle {
                credential: "key-1".to_string(),
                article_id: "art-9".to_string(),
            },
        ]
    );
    assert!(!state.view().is_polling);
}

#[test]
fn completed_without_article_fails_and_stops_polling() {
    init_logging();
    let (state, _) = update(polling_state(), Msg::PollTick);
    let (state, effects) = update(state, Msg::PollResolved(Ok(snapshot("completed"))));

    assert_eq!(effects, vec![Effect::StopPolling]);
    let view = state.view();
    assert_eq!(view.phase, SessionPhase::Failed);
    assert_eq!(
        view.error.as_deref(),
        Some("job completed but no article was produced")
    );
    assert!(!view.is_polling);

    // No further polls once the loop is gone.
    let (_state, effects) = update(state, Msg::PollTick);
    assert!(effects.is_empty());
}

#[test]
fn failed_status_surfaces_server_message() {
    init_logging();
    let mut failed = snapshot("failed");
    failed.error_message = Some("blocked by robots.txt".to_string());

    let (state, _) = update(polling_state(), Msg::PollTick);
    let (state, _) = update(state, Msg::PollResolved(Ok(failed)));

    let view = state.view();
    assert_eq!(view.phase, SessionPhase::Failed);
    assert_eq!(view.error.as_deref(), Some("blocked by robots.txt"));
    assert!(!view.is_polling);
}

#[test]
fn failed_status_without_message_uses_default() {
    init_logging();
    let (state, _) = update(polling_state(), Msg::PollTick);
    let (state, _) = update(state, Msg::PollResolved(Ok(snapshot("failed"))));

    assert_eq!(state.view().error.as_deref(), Some("the scrape job failed"));
}

#[test]
fn cancelled_status_is_informational_not_an_error() {
    init_logging();
    let (state, _) = update(polling_state(), Msg::PollTick);
    let (state, _) = update(state, Msg::PollResolved(Ok(snapshot("cancelled"))));

    let view = state.view();
    assert_eq!(view.phase, SessionPhase::Cancelled);
    assert!(view.error.is_none());
    assert_eq!(view.notice.as_deref(), Some("job cancelled"));
    assert!(!view.is_polling);
}

#[test]
fn first_poll_error_ends_the_session() {
    init_logging();
    let (state, _) = update(polling_state(), Msg::PollTick);
    let (state, effects) = update(state, Msg::PollResolved(Err("connection reset".to_string())));

    assert_eq!(effects, vec![Effect::StopPolling]);
    let view = state.view();
    assert_eq!(view.phase, SessionPhase::Failed);
    assert_eq!(view.error.as_deref(), Some("connection reset"));

    let (_state, effects) = update(state, Msg::PollTick);
    assert!(effects.is_empty());
}

#[test]
fn credential_loss_stops_the_loop_quietly() {
    init_logging();
    let (state, _) = update(
        polling_state(),
        Msg::PreferencesLoaded {
            credential: None,
            base_url: "http://backend.test".to_string(),
        },
    );
    let (state, effects) = update(state, Msg::PollTick);

    assert_eq!(effects, vec![Effect::StopPolling]);
    let view = state.view();
    assert!(!view.is_polling);
    assert!(view.error.is_none());
}

#[test]
fn late_poll_response_after_cancel_is_dropped() {
    init_logging();
    let (state, _) = update(polling_state(), Msg::PollTick);
    let (state, _) = update(state, Msg::CancelRequested);

    let mut done = snapshot("completed");
    done.article_id = Some("art-1".to_string());
    let (state, effects) = update(state, Msg::PollResolved(Ok(done)));

    assert!(effects.is_empty());
    assert_eq!(state.view().phase, SessionPhase::Cancelled);
    assert!(state.view().article.is_none());
}
