//! Miette diagnostic conversion for CLI errors.

use gsd_docs::DocsError;
use miette::Report;

use crate::error::CliError;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Docs(e) => docs_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        _ => miette::miette!("{}", err),
    }
}

/// Convert DocsError to miette Report
pub fn docs_error_to_miette(err: DocsError) -> Report {
    match err {
        DocsError::Discovery { message } => miette::miette!(
            "Package discovery failed: {}\n\nHint: Make sure the Go toolchain is installed and --path points at a module",
            message
        ),
        DocsError::Analysis { package, message } => miette::miette!(
            "Failed to analyze package {}: {}\n\nHint: Fix the source file; the last good build is still served",
            package,
            message
        ),
        DocsError::Pattern { pattern, source } => miette::miette!(
            "Invalid exclude pattern '{}': {}\n\nHint: Patterns are regular expressions",
            pattern,
            source
        ),
        other => miette::miette!("{}", other),
    }
}
