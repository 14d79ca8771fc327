//! Error types for the scaffolding pipeline
//!
//! Failures come in two tiers. A [`RenderError`] belongs to a single output file:
//! the generator logs it, leaves an empty file behind and keeps going. A
//! [`BuildError`] aborts the whole mission and is turned into a user-facing
//! message by the controller.

use std::io;
use std::path::PathBuf;

/// Per-file failure, recovered by the generator
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template not found: {0}")]
    Missing(String),

    #[error("template is not valid UTF-8: {0}")]
    NotUtf8(String),

    #[error("target escapes the project root: {0}")]
    Escape(String),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Build-level failure, aborts the mission
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Prerequisite check failed:\n{0}")]
    Prerequisite(String),

    #[error("Bootstrap command `{command}` failed: {detail}")]
    Bootstrap { command: String, detail: String },

    #[error("Environment setup `{command}` failed: {detail}")]
    Environment { command: String, detail: String },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Template pack error: {0}")]
    TemplatePack(String),

    #[error("Cancelled by user")]
    Cancelled,
}

impl BuildError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }

    /// One-line, lower-cased message shown to the end user
    pub fn user_message(&self) -> String {
        let text = self.to_string();
        let first = text.lines().next().unwrap_or(&text).trim_end_matches(':');
        let detail: Vec<&str> = text
            .lines()
            .skip(1)
            .map(|l| l.trim().trim_start_matches("- "))
            .filter(|l| !l.is_empty())
            .collect();
        if detail.is_empty() {
            first.to_lowercase()
        } else {
            format!("{}: {}", first, detail.join(", ")).to_lowercase()
        }
    }
}

impl From<io::Error> for BuildError {
    fn from(source: io::Error) -> Self {
        BuildError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}
