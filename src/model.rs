use serde::{Deserialize, Serialize};

pub const DEFAULT_LANG: &str = "text";
const TITLE_TOKENS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    pub id: String,
    pub title: String,
    pub body: String,
    pub lang: String,
    pub created_at: i64,
    pub formatted_body: String,
}

/// Listing view of a snippet. Never carries `body` or `formatted_body`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetSummary {
    pub id: String,
    pub title: String,
    pub created_at: i64,
}

/// A submission as it arrives from the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetDraft {
    #[serde(default)]
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub lang: String,
}

/// A draft that passed validation, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDraft {
    pub title: String,
    pub body: String,
    pub lang: String,
}

impl SnippetDraft {
    pub fn new(title: &str, body: &str, lang: &str) -> Self {
        Self {
            title: title.to_owned(),
            body: body.to_owned(),
            lang: lang.to_owned(),
        }
    }

    /// Applies the title and language defaults. Returns the draft untouched
    /// when the body is empty.
    pub fn normalize(self) -> Result<NormalizedDraft, SnippetDraft> {
        if self.body.is_empty() {
            return Err(self);
        }

        let lang = normalize_lang(&self.lang);
        let title = if self.title.trim().is_empty() {
            title_from_body(&self.body)
        } else {
            self.title
        };

        Ok(NormalizedDraft {
            title,
            body: self.body,
            lang,
        })
    }
}

pub fn normalize_lang(lang: &str) -> String {
    let lang = lang.trim();
    if lang.is_empty() {
        DEFAULT_LANG.to_owned()
    } else {
        lang.to_lowercase()
    }
}

pub fn title_from_body(body: &str) -> String {
    body.split_whitespace()
        .take(TITLE_TOKENS)
        .collect::<Vec<_>>()
        .join(" ")
}
