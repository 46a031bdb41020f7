//! Scanner for `@GSD:NAME` directive markers inside doc comments.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::markdown::MarkdownRenderer;

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*@(GSD|gsd):(\w+)?").expect("marker regex should always compile")
});

/// Result of scanning one line or block for a leading marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation<'a> {
    /// Text following the marker, or the whole input when unmatched.
    pub content: &'a str,
    /// Lower-cased marker name. Empty when unmatched or when no name follows the colon.
    pub marker: String,
    /// Whether a marker was found.
    pub matched: bool,
}

/// Detect a leading `@GSD:NAME` marker in `text`.
///
/// On a match the content has leading spaces removed, followed by at most one
/// newline. Marker names are not validated against a closed set.
pub fn annotation(text: &str) -> Annotation<'_> {
    let Some(caps) = MARKER_RE.captures(text) else {
        return Annotation {
            content: text,
            marker: String::new(),
            matched: false,
        };
    };

    let end = caps.get(0).map_or(0, |m| m.end());
    let rest = text[end..].trim_start_matches(' ');
    let content = rest.strip_prefix('\n').unwrap_or(rest);

    let marker = caps
        .get(2)
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_default();

    Annotation {
        content,
        marker,
        matched: true,
    }
}

/// Open the tagged container for a marker kind.
pub fn open_marker(buf: &mut String, marker: &str) {
    let _ = write!(buf, r#"<div class="marker marker-{marker}">"#);
}

/// Line-oriented block mode.
///
/// Lines starting with a marker are converted to HTML and wrapped in a marker
/// container; every other line is re-emitted verbatim.
pub fn mark_block(text: &str, md: &dyn MarkdownRenderer) -> String {
    let mut buf = String::with_capacity(text.len() + 32);

    for line in text.split('\n') {
        let scanned = annotation(line);
        if !scanned.matched {
            buf.push_str(line);
            buf.push('\n');
            continue;
        }

        let html = match md.to_html(scanned.content) {
            Ok(html) => html,
            Err(err) => {
                tracing::warn!(error = %err, "marker content left unconverted");
                scanned.content.to_string()
            }
        };

        open_marker(&mut buf, &scanned.marker);
        buf.push_str(&html);
        buf.push_str("</div>\n");
    }

    buf
}
