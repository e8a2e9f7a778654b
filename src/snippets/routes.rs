use axum::{
    Router,
    routing::{get, post},
};

use super::handler;
use crate::handler::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/snippets", post(handler::create_snippet))
        .route("/snippets/:id", get(handler::get_snippet))
        .route("/languages/:lang", get(handler::list_by_language))
}
