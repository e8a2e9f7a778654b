use thiserror::Error;

use crate::highlight::RenderError;
use crate::model::SnippetDraft;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The draft had an empty body. The draft is handed back unchanged.
    #[error("snippet body must not be empty")]
    EmptyBody(SnippetDraft),

    #[error("failed to connect to store at {host}:{port}: {source}")]
    Connection {
        host: String,
        port: u16,
        #[source]
        source: libsql::Error,
    },

    #[error("snippet was not persisted: {0}")]
    Persistence(String),

    #[error("snippet was not persisted: {0}")]
    Render(#[from] RenderError),

    #[error("store query failed: {0}")]
    Query(#[from] libsql::Error),

    #[error("store io failed: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// True for failures of the write path after validation passed.
    pub fn is_persistence(&self) -> bool {
        matches!(self, StoreError::Persistence(_) | StoreError::Render(_))
    }
}
