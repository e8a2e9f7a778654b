//! A small query builder over the `snippets` table.
//!
//! Stages are accumulated on a [`SnippetQuery`] value and compiled into a
//! single SQL statement, so filtering, projection, ordering and limiting all
//! happen inside the store. Whatever order the stages are added in, the
//! statement always evaluates filter, then order, then limit, and returns only
//! the projected columns.

use libsql::Value;

pub const TABLE: &str = "snippets";
pub const DEFAULT_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Title,
    Body,
    Lang,
    CreatedAt,
    FormattedBody,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Id,
        Field::Title,
        Field::Body,
        Field::Lang,
        Field::CreatedAt,
        Field::FormattedBody,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Title => "title",
            Field::Body => "body",
            Field::Lang => "lang",
            Field::CreatedAt => "created_at",
            Field::FormattedBody => "formatted_body",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Filter { field: Field, value: Value },
    Pluck(Vec<Field>),
    OrderBy { field: Field, direction: Direction },
    Limit(u32),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnippetQuery {
    stages: Vec<Stage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<Value>,
    /// Columns in the order they appear in each returned row.
    pub fields: Vec<Field>,
}

impl SnippetQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: Field, value: impl Into<Value>) -> Self {
        self.stages.push(Stage::Filter {
            field,
            value: value.into(),
        });
        self
    }

    pub fn pluck(mut self, fields: &[Field]) -> Self {
        self.stages.push(Stage::Pluck(fields.to_vec()));
        self
    }

    pub fn order_by(mut self, field: Field, direction: Direction) -> Self {
        self.stages.push(Stage::OrderBy { field, direction });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.stages.push(Stage::Limit(limit));
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn compile(&self) -> CompiledQuery {
        let mut filters = Vec::new();
        let mut params = Vec::new();
        let mut fields: Option<Vec<Field>> = None;
        let mut order = Vec::new();
        let mut limit: Option<u32> = None;

        for stage in &self.stages {
            match stage {
                Stage::Filter { field, value } => {
                    filters.push(format!("{} = ?", field.column()));
                    params.push(value.clone());
                }
                // A later pluck can only narrow an earlier one.
                Stage::Pluck(plucked) => {
                    fields = Some(match fields {
                        Some(current) => current.into_iter().filter(|f| plucked.contains(f)).collect(),
                        None => plucked.clone(),
                    });
                }
                Stage::OrderBy { field, direction } => {
                    order.push(format!("{} {}", field.column(), direction.as_sql()));
                }
                Stage::Limit(n) => {
                    limit = Some(limit.map_or(*n, |current| current.min(*n)));
                }
            }
        }

        let fields = fields.unwrap_or_else(|| Field::ALL.to_vec());
        let columns = fields.iter().map(Field::column).collect::<Vec<_>>().join(", ");
        let mut sql = format!("SELECT {} FROM {}", columns, TABLE);

        if !filters.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&filters.join(" AND "));
        }

        // Rows that tie on every ordering key come back in insertion order,
        // following the direction of the last ordering stage.
        if let Some(Stage::OrderBy { direction, .. }) = self
            .stages
            .iter()
            .rev()
            .find(|stage| matches!(stage, Stage::OrderBy { .. }))
        {
            order.push(format!("rowid {}", direction.as_sql()));
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        if let Some(n) = limit {
            sql.push_str(" LIMIT ?");
            params.push(Value::Integer(n as i64));
        }

        CompiledQuery { sql, params, fields }
    }
}
