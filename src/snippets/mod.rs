//! Snippet persistence and querying.
//!
//! [`SnippetStore`] owns the `snippets` schema and runs every operation on a
//! store handle acquired for that operation alone. Listings are expressed as a
//! [`SnippetQuery`] and evaluated entirely by the store.
//!
//! ```rust,ignore
//! let store = SnippetStore::new(connections, renderer);
//! store.bootstrap().await?;
//!
//! let id = store.create(SnippetDraft::new("", "puts 'hi'", "Ruby")).await?;
//! let latest = store.list_by_language("ruby", None).await?;
//! ```

mod handler;
pub mod query;
mod routes;
mod store;

pub use query::{CompiledQuery, Direction, Field, SnippetQuery};
pub use routes::routes;
pub use store::{Clock, SnippetStore};
