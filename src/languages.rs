use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub tag: &'static str,
    pub name: &'static str,
}

/// Languages offered on the submission form. Tags are the lexer names the
/// highlighter understands.
pub const LANGUAGES: &[Language] = &[
    Language { tag: "text", name: "Plain Text" },
    Language { tag: "bash", name: "Bash" },
    Language { tag: "c", name: "C" },
    Language { tag: "cpp", name: "C++" },
    Language { tag: "csharp", name: "C#" },
    Language { tag: "css", name: "CSS" },
    Language { tag: "diff", name: "Diff" },
    Language { tag: "erlang", name: "Erlang" },
    Language { tag: "go", name: "Go" },
    Language { tag: "haskell", name: "Haskell" },
    Language { tag: "html", name: "HTML" },
    Language { tag: "java", name: "Java" },
    Language { tag: "javascript", name: "JavaScript" },
    Language { tag: "json", name: "JSON" },
    Language { tag: "lua", name: "Lua" },
    Language { tag: "perl", name: "Perl" },
    Language { tag: "php", name: "PHP" },
    Language { tag: "python", name: "Python" },
    Language { tag: "ruby", name: "Ruby" },
    Language { tag: "rust", name: "Rust" },
    Language { tag: "scala", name: "Scala" },
    Language { tag: "sql", name: "SQL" },
    Language { tag: "yaml", name: "YAML" },
];

pub fn is_supported(tag: &str) -> bool {
    let tag = tag.to_lowercase();
    LANGUAGES.iter().any(|lang| lang.tag == tag)
}
