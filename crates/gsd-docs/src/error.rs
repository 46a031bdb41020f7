use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for documentation operations.
pub type Result<T> = std::result::Result<T, DocsError>;

/// Error variants raised while discovering, analyzing and rendering a corpus.
#[derive(Debug, Error)]
pub enum DocsError {
    /// The source tooling could not be invoked or its output could not be decoded.
    #[error("package discovery failed: {message}")]
    Discovery {
        /// Human-readable failure, including tool stderr when available.
        message: String,
    },

    /// A single package failed structural analysis.
    #[error("failed to analyze package '{package}': {message}")]
    Analysis {
        /// Import path of the offending package.
        package: String,
        /// What went wrong, usually naming the file.
        message: String,
    },

    /// A page failed to render.
    #[error("failed to render page '{page}': {message}")]
    Render {
        /// Virtual path of the page being rendered.
        page: String,
        /// Template engine message.
        message: String,
    },

    /// An exclusion pattern failed to compile.
    #[error("invalid exclude pattern '{pattern}': {source}")]
    Pattern {
        /// The pattern as written in configuration.
        pattern: String,
        /// Compiler error from the regex engine.
        #[source]
        source: regex::Error,
    },

    /// Markdown conversion failed. Callers fall back to raw text.
    #[error("markdown conversion failed: {0}")]
    Markdown(String),

    /// Failed to read or write a file.
    #[error("I/O error at '{path}': {source}")]
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl DocsError {
    /// Helper to build an analysis error for a package.
    pub fn analysis(package: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Analysis {
            package: package.into(),
            message: message.into(),
        }
    }

    /// Helper to build a render error for a virtual path.
    pub fn render(page: impl Into<String>, message: impl ToString) -> Self {
        Self::Render {
            page: page.into(),
            message: message.to_string(),
        }
    }

    /// Helper to attach a path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
