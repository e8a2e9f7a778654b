use std::sync::Arc;

use libsql::{Connection, Row};

use super::query::{DEFAULT_LIMIT, Direction, Field, SnippetQuery};
use crate::db::ConnectionManager;
use crate::error::StoreError;
use crate::highlight::Renderer;
use crate::model::{Snippet, SnippetDraft, SnippetSummary, normalize_lang};

const SCHEMA: &[(&str, &str)] = &[
    ("snippets", include_str!("migrations/001_snippets.sql")),
    (
        "snippets_lang_created_at",
        include_str!("migrations/002_snippets_lang_created_at.sql"),
    ),
];

const SNIPPET_FIELDS: [Field; 6] = Field::ALL;
const SUMMARY_FIELDS: [Field; 3] = [Field::Id, Field::Title, Field::CreatedAt];

pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

pub struct SnippetStore {
    connections: ConnectionManager,
    renderer: Renderer,
    clock: Clock,
}

impl SnippetStore {
    pub fn new(connections: ConnectionManager, renderer: Renderer) -> Self {
        Self {
            connections,
            renderer,
            clock: Arc::new(|| chrono::Utc::now().timestamp()),
        }
    }

    /// Replaces the source of `created_at` timestamps.
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Makes sure the database and the `snippets` table exist. Safe to run
    /// repeatedly.
    pub async fn bootstrap(&self) -> Result<(), StoreError> {
        let handle = self.connections.acquire().await?;
        tracing::info!(
            database = self.connections.database(),
            mode = ?self.connections.mode(),
            "[db] database ready"
        );

        for (name, sql) in SCHEMA {
            Self::ensure_schema_object(handle.connection(), name, sql).await?;
        }

        handle.release();
        Ok(())
    }

    async fn ensure_schema_object(conn: &Connection, name: &str, sql: &str) -> Result<(), StoreError> {
        match conn.execute_batch(sql).await {
            Ok(_) => {
                tracing::info!("[db] created {}", name);
                Ok(())
            }
            Err(e) => {
                if e.to_string().contains("already exists") {
                    tracing::info!("[db] {} already exists, skipping", name);
                    Ok(())
                } else {
                    Err(e.into())
                }
            }
        }
    }

    pub async fn create(&self, draft: SnippetDraft) -> Result<String, StoreError> {
        let draft = draft.normalize().map_err(StoreError::EmptyBody)?;
        let created_at = (self.clock)();

        let handle = self.connections.acquire().await?;
        let formatted_body = self.renderer.render(&draft.body, &draft.lang).await?;

        let query = r#"
            INSERT INTO snippets (title, body, lang, created_at, formatted_body)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
        "#;

        let mut rows = handle
            .connection()
            .query(
                query,
                libsql::params![
                    draft.title.as_str(),
                    draft.body.as_str(),
                    draft.lang.as_str(),
                    created_at,
                    formatted_body
                ],
            )
            .await?;

        let mut ids: Vec<String> = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get(0)?);
        }

        match ids.as_slice() {
            [id] => {
                tracing::info!(id = %id, lang = %draft.lang, created_at, "created snippet");
                Ok(id.clone())
            }
            _ => {
                tracing::error!(
                    inserted = ids.len(),
                    response = ?ids,
                    "insert did not report exactly one created snippet"
                );
                Err(StoreError::Persistence(format!(
                    "expected 1 inserted record, store reported {}",
                    ids.len()
                )))
            }
        }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Snippet>, StoreError> {
        let handle = self.connections.acquire().await?;
        let compiled = SnippetQuery::new()
            .filter(Field::Id, id)
            .pluck(&SNIPPET_FIELDS)
            .limit(1)
            .compile();

        let mut rows = handle.connection().query(&compiled.sql, compiled.params).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row_to_snippet(&row)?))
        } else {
            Ok(None)
        }
    }

    /// Newest snippets in `lang` (matched case-insensitively), at most
    /// `limit` of them, ten by default.
    pub async fn list_by_language(
        &self,
        lang: &str,
        limit: Option<u32>,
    ) -> Result<Vec<SnippetSummary>, StoreError> {
        let lang = normalize_lang(lang);
        let handle = self.connections.acquire().await?;
        let compiled = SnippetQuery::new()
            .filter(Field::Lang, lang.as_str())
            .pluck(&SUMMARY_FIELDS)
            .order_by(Field::CreatedAt, Direction::Desc)
            .limit(limit.unwrap_or(DEFAULT_LIMIT))
            .compile();

        let mut rows = handle.connection().query(&compiled.sql, compiled.params).await?;
        let mut summaries = Vec::new();

        while let Some(row) = rows.next().await? {
            summaries.push(row_to_summary(&row)?);
        }

        tracing::debug!(lang = %lang, count = summaries.len(), "listed snippets");
        Ok(summaries)
    }
}

fn row_to_snippet(row: &Row) -> Result<Snippet, libsql::Error> {
    Ok(Snippet {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        lang: row.get(3)?,
        created_at: row.get(4)?,
        formatted_body: row.get(5)?,
    })
}

fn row_to_summary(row: &Row) -> Result<SnippetSummary, libsql::Error> {
    Ok(SnippetSummary {
        id: row.get(0)?,
        title: row.get(1)?,
        created_at: row.get(2)?,
    })
}
