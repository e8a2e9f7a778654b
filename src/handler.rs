use std::sync::Arc;

use axum::response::Response;
use serde::Serialize;
use tracing::info;

use crate::api::success;
use crate::languages::{LANGUAGES, Language};
use crate::snippets::SnippetStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SnippetStore>,
}

#[derive(Debug, Serialize)]
struct Index {
    status: &'static str,
    languages: &'static [Language],
}

pub async fn index() -> Response {
    info!("got index request");
    success(Index {
        status: "ok",
        languages: LANGUAGES,
    })
}

pub async fn languages() -> Response {
    success(LANGUAGES)
}
