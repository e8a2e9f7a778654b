#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use repasties::config::{HighlightConfig, StoreConfig, StoreMode};
use repasties::db::ConnectionManager;
use repasties::highlight::{LocalHighlighter, Renderer};
use repasties::snippets::SnippetStore;
use tempfile::TempDir;

pub const START_TIME: i64 = 1_700_000_000;

/// Wraps stdin in a <pre> tagged with the language passed after `-l`.
pub const ECHO_HIGHLIGHTER: &str = r#"printf '<pre class="%s">' "$2"; cat; printf '</pre>'"#;
pub const FAILING_HIGHLIGHTER: &str = "echo 'no lexer for alias' >&2; exit 1";

pub fn shell_renderer(script: &str) -> Renderer {
    Renderer::Local(LocalHighlighter::new(
        "sh",
        vec!["-c".to_string(), script.to_string(), "highlighter".to_string()],
        &HighlightConfig::default(),
    ))
}

pub fn local_store_config(dir: &TempDir) -> StoreConfig {
    StoreConfig {
        mode: StoreMode::Local,
        data_dir: Some(dir.path().to_path_buf()),
        ..StoreConfig::default()
    }
}

/// A remote store nobody listens on.
pub fn unreachable_store_config() -> StoreConfig {
    StoreConfig {
        mode: StoreMode::Remote,
        host: "127.0.0.1".to_string(),
        port: 1,
        ..StoreConfig::default()
    }
}

/// Each call returns one second later than the previous one.
pub fn ticking_clock() -> impl Fn() -> i64 + Send + Sync + 'static {
    let now = Arc::new(AtomicI64::new(START_TIME));
    move || now.fetch_add(1, Ordering::SeqCst)
}

pub async fn setup_store_with(script: &str) -> (SnippetStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let connections = ConnectionManager::open(&local_store_config(&temp_dir))
        .await
        .unwrap();
    let store = SnippetStore::new(connections, shell_renderer(script)).with_clock(ticking_clock());
    store.bootstrap().await.unwrap();
    (store, temp_dir)
}

pub async fn setup_store() -> (SnippetStore, TempDir) {
    setup_store_with(ECHO_HIGHLIGHTER).await
}
