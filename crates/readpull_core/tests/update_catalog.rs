use std::sync::Once;

use readpull_core::{update, ArticlePage, ArticleQuery, ArticleView, Effect, Msg, SessionState};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(client_logging::initialize_for_tests);
}

fn article(id: &str) -> ArticleView {
    ArticleView {
        id: id.to_string(),
        url: format!("https://example.com/{id}"),
        title: format!("Article {id}"),
        html_content: None,
        pdf_path: None,
        site_source: None,
        created_at: "2025-11-02T10:00:00Z".to_string(),
        scraped_at: None,
    }
}

#[test]
fn listing_carries_the_query_and_optional_credential() {
    init_logging();
    let query = ArticleQuery {
        limit: 10,
        offset: 20,
        search: Some("rust".to_string()),
        site_source: None,
    };

    // Without a credential the listing is still allowed.
    let (state, effects) = update(SessionState::new(), Msg::ArticlesRequested(query.clone()));
    assert_eq!(
        effects,
        vec![Effect::FetchArticles {
            credential: None,
            query: query.clone(),
        }]
    );
    assert!(state.view().catalog.is_loading);

    let (state, _) = update(
        state,
        Msg::PreferencesLoaded {
            credential: Some("key-1".to_string()),
            base_url: "http://backend.test".to_string(),
        },
    );
    let (_state, effects) = update(state, Msg::ArticlesRequested(query.clone()));
    assert_eq!(
        effects,
        vec![Effect::FetchArticles {
            credential: Some("key-1".to_string()),
            query,
        }]
    );
}

#[test]
fn listing_resolves_into_the_catalog() {
    init_logging();
    let (state, _) = update(
        SessionState::new(),
        Msg::ArticlesRequested(ArticleQuery::default()),
    );
    let (state, effects) = update(
        state,
        Msg::ArticlesResolved(Ok(ArticlePage {
            articles: vec![article("a1"), article("a2")],
            total: 12,
        })),
    );

    assert!(effects.is_empty());
    let catalog = state.view().catalog;
    assert_eq!(catalog.articles.len(), 2);
    assert_eq!(catalog.total, 12);
    assert!(!catalog.is_loading);
    assert!(catalog.error.is_none());
}

#[test]
fn listing_failure_sets_the_catalog_error() {
    init_logging();
    let (state, _) = update(
        SessionState::new(),
        Msg::ArticlesRequested(ArticleQuery::default()),
    );
    let (state, _) = update(state, Msg::ArticlesResolved(Err("http status 502".to_string())));

    let catalog = state.view().catalog;
    assert_eq!(catalog.error.as_deref(), Some("http status 502"));
    assert!(!catalog.is_loading);
    assert!(catalog.articles.is_empty());
}
