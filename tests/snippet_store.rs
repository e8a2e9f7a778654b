//! Integration tests for the snippet store against a local libsql database.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::*;
use repasties::db::ConnectionManager;
use repasties::error::StoreError;
use repasties::model::{SnippetDraft, SnippetSummary};
use repasties::snippets::SnippetStore;

async fn create(store: &SnippetStore, title: &str, body: &str, lang: &str) -> String {
    store
        .create(SnippetDraft::new(title, body, lang))
        .await
        .expect("create snippet")
}

#[tokio::test]
async fn create_then_get_returns_normalized_record() {
    let (store, _temp) = setup_store().await;

    let id = create(&store, "", "hello brave new world", "Ruby").await;
    let snippet = store.get_by_id(&id).await.unwrap().expect("snippet should exist");

    assert_eq!(snippet.id, id);
    assert_eq!(snippet.title, "hello brave new");
    assert_eq!(snippet.body, "hello brave new world");
    assert_eq!(snippet.lang, "ruby");
    assert_eq!(snippet.created_at, START_TIME);
    assert_eq!(snippet.formatted_body, r#"<pre class="ruby">hello brave new world</pre>"#);
}

#[tokio::test]
async fn plain_text_is_stored_without_highlighting() {
    let (store, _temp) = setup_store_with(FAILING_HIGHLIGHTER).await;

    let body = "<script>left as submitted</script>\n";
    let id = create(&store, "raw", body, "").await;
    let snippet = store.get_by_id(&id).await.unwrap().unwrap();

    assert_eq!(snippet.lang, "text");
    assert_eq!(snippet.formatted_body, body);
}

#[tokio::test]
async fn ids_are_unique_and_opaque() {
    let (store, _temp) = setup_store().await;

    let mut ids = HashSet::new();
    for n in 0..20 {
        let id = create(&store, "", &format!("snippet number {n}"), "text").await;
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        ids.insert(id);
    }
    assert_eq!(ids.len(), 20);
}

#[tokio::test]
async fn empty_body_is_rejected_before_touching_the_store() {
    let connections = ConnectionManager::open(&unreachable_store_config()).await.unwrap();
    let store = SnippetStore::new(connections, shell_renderer(ECHO_HIGHLIGHTER));

    let draft = SnippetDraft::new("kept title", "", "Ruby");
    match store.create(draft.clone()).await {
        Err(StoreError::EmptyBody(returned)) => assert_eq!(returned, draft),
        other => panic!("expected EmptyBody, got {other:?}"),
    }

    // The same store fails to connect once a valid draft gets that far.
    let err = store
        .create(SnippetDraft::new("", "puts 1", "ruby"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Connection { .. }));
}

#[tokio::test]
async fn unreachable_store_fails_reads_with_connection_error() {
    let connections = ConnectionManager::open(&unreachable_store_config()).await.unwrap();
    let store = SnippetStore::new(connections, shell_renderer(ECHO_HIGHLIGHTER));

    assert!(matches!(
        store.get_by_id("anything").await,
        Err(StoreError::Connection { .. })
    ));
    assert!(matches!(
        store.list_by_language("ruby", None).await,
        Err(StoreError::Connection { .. })
    ));
    assert!(matches!(store.bootstrap().await, Err(StoreError::Connection { .. })));
}

#[tokio::test]
async fn missing_id_is_not_found() {
    let (store, _temp) = setup_store().await;
    create(&store, "", "exists", "text").await;

    assert!(store.get_by_id("does-not-exist").await.unwrap().is_none());
    assert!(store.get_by_id("").await.unwrap().is_none());
}

#[tokio::test]
async fn failed_highlighting_writes_nothing() {
    let (store, _temp) = setup_store_with(FAILING_HIGHLIGHTER).await;

    let err = store
        .create(SnippetDraft::new("", "fn main() {}", "rust"))
        .await
        .unwrap_err();
    assert!(err.is_persistence(), "unexpected error: {err:?}");
    assert!(store.list_by_language("rust", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn listing_returns_newest_first_up_to_limit() {
    let (store, _temp) = setup_store().await;

    let mut ruby_ids = Vec::new();
    for n in 0..5 {
        ruby_ids.push(create(&store, &format!("ruby {n}"), &format!("puts {n}"), "ruby").await);
        create(&store, "", &format!("print({n})"), "python").await;
    }

    let listed = store.list_by_language("ruby", Some(2)).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, ruby_ids[4]);
    assert_eq!(listed[1].id, ruby_ids[3]);
    assert_eq!(listed[0].title, "ruby 4");
    assert!(listed[0].created_at > listed[1].created_at);

    let all_ruby = store.list_by_language("ruby", Some(50)).await.unwrap();
    assert_eq!(all_ruby.len(), 5);
    assert!(all_ruby.windows(2).all(|w| w[0].created_at > w[1].created_at));
}

#[tokio::test]
async fn listing_language_match_is_case_insensitive() {
    let (store, _temp) = setup_store().await;

    for n in 0..3 {
        create(&store, "", &format!("puts {n}"), "RUBY").await;
    }

    let lower: Vec<SnippetSummary> = store.list_by_language("ruby", None).await.unwrap();
    let mixed = store.list_by_language("Ruby", None).await.unwrap();
    assert_eq!(lower.len(), 3);
    assert_eq!(lower, mixed);
}

#[tokio::test]
async fn listing_is_exact_match_only() {
    let (store, _temp) = setup_store().await;
    create(&store, "", "x", "javascript").await;
    create(&store, "", "y", "java").await;

    let java = store.list_by_language("java", None).await.unwrap();
    assert_eq!(java.len(), 1);
    assert!(store.list_by_language("jav", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn listing_defaults_to_ten_results() {
    let (store, _temp) = setup_store().await;
    for n in 0..12 {
        create(&store, "", &format!("package main // {n}"), "go").await;
    }

    assert_eq!(store.list_by_language("go", None).await.unwrap().len(), 10);
}

#[tokio::test]
async fn equal_timestamps_list_in_reverse_insertion_order() {
    let (store, _temp) = setup_store().await;
    let store = store.with_clock(|| START_TIME);

    let first = create(&store, "", "a", "lua").await;
    let second = create(&store, "", "b", "lua").await;
    let third = create(&store, "", "c", "lua").await;

    let listed = store.list_by_language("lua", None).await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec![third.as_str(), second.as_str(), first.as_str()]);
}

#[tokio::test]
async fn bootstrap_is_idempotent() {
    let (store, _temp) = setup_store().await;
    let id = create(&store, "", "survives a second bootstrap", "text").await;

    store.bootstrap().await.unwrap();
    store.bootstrap().await.unwrap();

    let handle = store.connections().acquire().await.unwrap();
    let mut rows = handle
        .connection()
        .query(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'snippets'",
            (),
        )
        .await
        .unwrap();
    let row = rows.next().await.unwrap().unwrap();
    assert_eq!(row.get::<i64>(0).unwrap(), 1);
    handle.release();

    assert!(store.get_by_id(&id).await.unwrap().is_some());
}

#[tokio::test]
async fn concurrent_creates_use_independent_handles() {
    let (store, _temp) = setup_store().await;
    let store = Arc::new(store);

    let tasks: Vec<_> = (0..8)
        .map(|n| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .create(SnippetDraft::new("", &format!("concurrent {n}"), "text"))
                    .await
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for task in tasks {
        ids.insert(task.await.unwrap().unwrap());
    }
    assert_eq!(ids.len(), 8);
    assert_eq!(store.list_by_language("text", Some(100)).await.unwrap().len(), 8);
}
