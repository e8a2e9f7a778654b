use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};

use crate::model::SnippetDraft;

pub const MAX_LIST_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
}

impl ListParams {
    pub fn clamped_limit(&self) -> Option<u32> {
        self.limit.map(|limit| limit.clamp(1, MAX_LIST_LIMIT))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct RejectedDraft {
    pub error: String,
    pub draft: SnippetDraft,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedSnippet {
    pub id: String,
}

pub fn success<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse { data })).into_response()
}

pub fn created(id: String) -> Response {
    let location = format!("/snippets/{}", id);
    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ApiResponse {
            data: CreatedSnippet { id },
        }),
    )
        .into_response()
}

/// Sends the client back to the index, used for missing snippets and
/// failed writes.
pub fn to_index() -> Response {
    Redirect::to("/").into_response()
}

pub fn rejected(error: &str, draft: SnippetDraft) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(RejectedDraft {
            error: error.to_string(),
            draft,
        }),
    )
        .into_response()
}

pub fn unavailable(msg: &str) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: msg.to_string(),
        }),
    )
        .into_response()
}

pub fn internal_error(msg: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: msg.to_string(),
        }),
    )
        .into_response()
}
