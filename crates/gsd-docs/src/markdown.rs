//! Markdown conversion and annotation-aware documentation blocks.

use markdown::{CompileOptions, Options, ParseOptions};
use serde::Serialize;

use crate::annotation::{annotation, mark_block, open_marker};
use crate::error::{DocsError, Result};

/// Converts Markdown text into HTML.
///
/// Implementations are constructed once and shared by every consumer of a
/// corpus, so they must be usable from several threads.
pub trait MarkdownRenderer: Send + Sync {
    /// Render `text` to an HTML fragment.
    fn to_html(&self, text: &str) -> Result<String>;
}

/// GitHub-flavoured Markdown backed by the `markdown` crate.
///
/// Raw HTML is passed through so marker containers produced by the
/// annotation scanner survive a second conversion pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct GfmMarkdown;

impl GfmMarkdown {
    // `Options` carries boxed parse hooks, so it is built per call rather than stored.
    fn options() -> Options {
        Options {
            parse: ParseOptions::gfm(),
            compile: CompileOptions {
                allow_dangerous_html: true,
                ..CompileOptions::gfm()
            },
        }
    }
}

impl MarkdownRenderer for GfmMarkdown {
    fn to_html(&self, text: &str) -> Result<String> {
        markdown::to_html_with_options(text, &Self::options())
            .map_err(|message| DocsError::Markdown(message.to_string()))
    }
}

/// A converted fragment together with the source it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Markdown {
    /// Original text.
    pub text: String,
    /// Rendered HTML.
    pub html: String,
    /// Marker that produced this fragment, if any.
    pub marker: String,
}

/// Rendered documentation for a package, type or function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Documentation {
    /// Raw comment text.
    pub doc: String,
    /// Full HTML body.
    pub body: String,
    /// Summary fragment shown in listings.
    pub summary: Markdown,
    /// Texts of `summary` blocks that were ignored because an earlier one won.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<String>,
}

impl Documentation {
    /// Build documentation from a doc comment.
    ///
    /// The comment is split into blank-line separated blocks. Each block is
    /// scanned for a marker and converted on its own. The first block is the
    /// default summary; the first block marked `summary` replaces it, and any
    /// later `summary` block is recorded in [`Documentation::conflicts`].
    pub fn new(text: &str, md: &dyn MarkdownRenderer) -> Self {
        let mut doc = Documentation {
            doc: text.to_string(),
            ..Default::default()
        };

        let trimmed = text.trim_matches(' ');
        if trimmed.trim().is_empty() {
            return doc;
        }

        for (index, block) in trimmed.split("\n\n").enumerate() {
            let scanned = annotation(block);

            let mut segment = String::new();
            if scanned.matched {
                open_marker(&mut segment, &scanned.marker);
            }

            match md.to_html(scanned.content) {
                Ok(html) => segment.push_str(&html),
                Err(err) => {
                    tracing::warn!(error = %err, "documentation block left unconverted");
                    segment.push_str(block);
                }
            }

            if scanned.matched {
                segment.push_str("</div>\n\n");
            }

            if index == 0 {
                doc.summary = Markdown {
                    text: scanned.content.to_string(),
                    html: segment.clone(),
                    marker: String::new(),
                };
            }

            if scanned.marker == "summary" {
                if doc.summary.marker.is_empty() {
                    doc.summary = Markdown {
                        text: scanned.content.to_string(),
                        html: segment.clone(),
                        marker: scanned.marker.clone(),
                    };
                } else {
                    tracing::warn!(
                        summary = %doc.summary.text,
                        ignored = %scanned.content,
                        "multiple summary markers; keeping the first"
                    );
                    doc.conflicts.push(scanned.content.to_string());
                }
            }

            doc.body.push_str(&segment);
        }

        doc
    }

    /// Whether there is anything to show.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Convert free text containing line markers to HTML in one pass.
///
/// Falls back to the original text when conversion fails.
pub fn convert_markdown(text: &str, md: &dyn MarkdownRenderer) -> String {
    let input = mark_block(text.trim_matches(' '), md);
    match md.to_html(&input) {
        Ok(html) => html,
        Err(err) => {
            tracing::warn!(error = %err, "markdown conversion failed");
            text.to_string()
        }
    }
}
