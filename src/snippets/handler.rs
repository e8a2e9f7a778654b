//! HTTP handlers for snippets

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};

use crate::api::{ListParams, created, internal_error, rejected, success, to_index, unavailable};
use crate::error::StoreError;
use crate::handler::AppState;
use crate::languages;
use crate::model::SnippetDraft;
use crate::unpack_error;

fn store_failure(action: &str, err: StoreError) -> Response {
    match err {
        StoreError::EmptyBody(draft) => rejected("snippet body must not be empty", draft),
        StoreError::Connection { .. } => unavailable("snippet store is unavailable"),
        e if e.is_persistence() => {
            tracing::error!(error = %unpack_error(&e), "failed to {}", action);
            to_index()
        }
        e => {
            tracing::error!(error = %unpack_error(&e), "failed to {}", action);
            internal_error(&format!("failed to {}", action))
        }
    }
}

pub async fn create_snippet(State(state): State<AppState>, Json(draft): Json<SnippetDraft>) -> Response {
    if !draft.lang.is_empty() && !languages::is_supported(&draft.lang) {
        tracing::warn!(lang = %draft.lang, "snippet submitted with an unlisted language");
    }

    match state.store.create(draft).await {
        Ok(id) => created(id),
        Err(e) => store_failure("create snippet", e),
    }
}

pub async fn get_snippet(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.get_by_id(&id).await {
        Ok(Some(snippet)) => success(snippet),
        Ok(None) => {
            tracing::info!(id = %id, "snippet not found");
            to_index()
        }
        Err(e) => store_failure("get snippet", e),
    }
}

pub async fn list_by_language(
    State(state): State<AppState>,
    Path(lang): Path<String>,
    Query(params): Query<ListParams>,
) -> Response {
    match state.store.list_by_language(&lang, params.clamped_limit()).await {
        Ok(summaries) => success(summaries),
        Err(e) => store_failure("list snippets", e),
    }
}
