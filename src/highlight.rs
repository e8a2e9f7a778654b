//! Syntax highlighting for snippet bodies.
//!
//! Two strategies exist: a local `pygmentize`-compatible executable fed over
//! stdin, and a remote highlighting service reached with a form POST. The
//! strategy is chosen once at start-up by [`Renderer::select`] and never
//! re-checked.

use std::env;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::HighlightConfig;
use crate::model::DEFAULT_LANG;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to spawn highlighter {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("highlighter io failed: {0}")]
    Io(#[from] io::Error),

    #[error("highlighter exited with status {status}: {stderr}")]
    Exit { status: i32, stderr: String },

    #[error("highlighter produced invalid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("highlight request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(Debug)]
pub enum Renderer {
    Local(LocalHighlighter),
    Remote(RemoteHighlighter),
}

impl Renderer {
    /// Picks the local strategy when the configured executable is on `PATH`,
    /// the remote one otherwise.
    pub fn select(cfg: &HighlightConfig) -> Self {
        Self::select_with_path(cfg, env::var_os("PATH").as_deref())
    }

    pub fn select_with_path(cfg: &HighlightConfig, search_path: Option<&OsStr>) -> Self {
        let mut parts = cfg.executable.split_whitespace();
        let found = parts
            .next()
            .and_then(|program| find_on_path(program, search_path));

        let renderer = match found {
            Some(program) => {
                let leading_args = parts.map(str::to_owned).collect();
                Renderer::Local(LocalHighlighter::new(program, leading_args, cfg))
            }
            None => Renderer::Remote(RemoteHighlighter::new(&cfg.remote_url)),
        };

        tracing::info!(
            strategy = renderer.strategy(),
            executable = %cfg.executable,
            remote_url = %cfg.remote_url,
            "selected highlight strategy"
        );
        renderer
    }

    pub fn strategy(&self) -> &'static str {
        match self {
            Renderer::Local(_) => "local",
            Renderer::Remote(_) => "remote",
        }
    }

    /// Renders `code` as HTML markup. Plain text is passed through untouched.
    pub async fn render(&self, code: &str, lang: &str) -> Result<String, RenderError> {
        if lang == DEFAULT_LANG {
            return Ok(code.to_owned());
        }

        tracing::debug!(strategy = self.strategy(), lang, bytes = code.len(), "rendering snippet");
        match self {
            Renderer::Local(local) => local.render(code, lang).await,
            Renderer::Remote(remote) => remote.render(code, lang).await,
        }
    }
}

#[derive(Debug)]
pub struct LocalHighlighter {
    program: PathBuf,
    leading_args: Vec<String>,
    style: String,
    encoding: String,
    line_numbers: bool,
}

impl LocalHighlighter {
    pub fn new(program: impl Into<PathBuf>, leading_args: Vec<String>, cfg: &HighlightConfig) -> Self {
        Self {
            program: program.into(),
            leading_args,
            style: cfg.style.clone(),
            encoding: cfg.encoding.clone(),
            line_numbers: cfg.line_numbers,
        }
    }

    fn args(&self, lang: &str) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.extend([
            "-l".to_string(),
            lang.to_string(),
            "-f".to_string(),
            "html".to_string(),
            "-O".to_string(),
            format!(
                "encoding={},style={},linenos={}",
                self.encoding,
                self.style,
                if self.line_numbers { 1 } else { 0 }
            ),
        ]);
        args
    }

    pub async fn render(&self, code: &str, lang: &str) -> Result<String, RenderError> {
        let mut child = Command::new(&self.program)
            .args(self.args(lang))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RenderError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "highlighter stdin unavailable"))?;

        // stdin is fed while stdout/stderr are drained, so output larger
        // than the pipe buffer cannot stall the child.
        let feed = async move {
            stdin.write_all(code.as_bytes()).await?;
            stdin.shutdown().await
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(
                program = %self.program.display(),
                lang,
                status = ?output.status,
                stderr = %stderr,
                "highlighter failed"
            );
            return Err(RenderError::Exit {
                status: output.status.code().unwrap_or(-1),
                stderr,
            });
        }
        fed?;

        Ok(String::from_utf8(output.stdout)?)
    }
}

#[derive(Debug)]
pub struct RemoteHighlighter {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteHighlighter {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_owned(),
        }
    }

    pub async fn render(&self, code: &str, lang: &str) -> Result<String, RenderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("lang", lang), ("code", code)])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }
}

/// Resolves `program` the way a shell would: paths containing a separator
/// are taken as-is, bare names are searched in `search_path`.
pub fn find_on_path(program: &str, search_path: Option<&OsStr>) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    env::split_paths(search_path?)
        .map(|dir| dir.join(program))
        .find(|path| is_executable(path))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
