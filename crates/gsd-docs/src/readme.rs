//! README files shown at the site root and for directories without a package.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{DocsError, Result};
use crate::markdown::{MarkdownRenderer, convert_markdown};
use crate::matcher::{Matcher, normalize};

/// File names tried in each directory, first match wins.
pub const README_FILE_NAMES: &[&str] = &["README.md", "Readme.md", "readme.md"];

/// A rendered README.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readme {
    /// Directory relative to the source root, `/`-separated, empty for the root.
    pub dir: String,
    pub file: PathBuf,
    /// Converted HTML, with `@GSD:` line markers wrapped.
    pub html: String,
}

/// Find and render the README of every directory below `root`.
///
/// Directories the matcher can exclude as a prefix are not entered.
/// Unreadable directories are skipped; an unreadable README is an error.
#[tracing::instrument(skip_all, fields(root = %root.display()))]
pub fn find_readmes(root: &Path, matcher: &dyn Matcher, md: &dyn MarkdownRenderer) -> Result<Vec<Readme>> {
    let mut readmes = Vec::new();
    let mut walker = WalkDir::new(root).follow_links(false).sort_by_file_name().into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable path");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(root)
            .map(|rel| normalize(&rel.to_string_lossy(), false))
            .unwrap_or_default();
        if !rel.is_empty() && matcher.excludes_prefix(&normalize(&rel, true)) {
            walker.skip_current_dir();
            continue;
        }

        let Some(file) = README_FILE_NAMES
            .iter()
            .map(|name| entry.path().join(name))
            .find(|file| file.is_file())
        else {
            continue;
        };
        let text = fs::read_to_string(&file).map_err(|err| DocsError::io(&file, err))?;
        readmes.push(Readme {
            dir: rel,
            html: convert_markdown(&text, md),
            file,
        });
    }

    tracing::debug!(count = readmes.len(), "found readmes");
    Ok(readmes)
}
