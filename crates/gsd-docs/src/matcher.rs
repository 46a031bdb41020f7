//! Path exclusion patterns and directory pruning.
//!
//! Exclusion patterns are regular expressions: any path they match is left
//! out of the corpus and the watch set. [`Matcher::excludes_prefix`] answers
//! the stronger question used while walking the tree: can *every* path that
//! starts with this prefix be skipped? It may return false negatives but
//! never false positives.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use regex_syntax::hir::{Hir, HirKind, Look};

use crate::error::{DocsError, Result};

/// Patterns excluded from every corpus.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    // VCS dirs
    r"(^|/)\.git/",
    r"(^|/)\.hg/",
    r"(^|/)\.svn/",
    // Vim
    r"~$",
    r"\.swp$",
    // Emacs
    r"\.#",
    r"(^|/)#.*#$",
    // macOS
    r"(^|/)\.DS_Store$",
    // node
    r"(^|/)node_modules/",
];

/// Decides whether paths are excluded.
pub trait Matcher: fmt::Display + Send + Sync {
    /// Whether this particular path is excluded.
    fn matches(&self, path: &str) -> bool;

    /// Whether no path with `prefix` can possibly be included.
    fn excludes_prefix(&self, prefix: &str) -> bool;
}

/// An inverse (exclusion) regex matcher.
#[derive(Debug)]
pub struct RegexMatcher {
    regex: Regex,
    can_exclude_prefix: OnceLock<bool>,
}

impl RegexMatcher {
    /// Compile an exclusion pattern.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| DocsError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            regex,
            can_exclude_prefix: OnceLock::new(),
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether a match on a prefix is guaranteed to persist for every extension of it.
    ///
    /// Only zero-width assertions can make a regex accept a string but reject a
    /// longer one. Start anchors cannot, so the pattern is prefix-stable when its
    /// syntax tree contains no other assertion.
    fn prefix_stable(&self) -> bool {
        *self.can_exclude_prefix.get_or_init(|| {
            let hir = match regex_syntax::Parser::new().parse(self.regex.as_str()) {
                Ok(hir) => hir,
                Err(err) => {
                    tracing::debug!(pattern = self.as_str(), error = %err, "cannot analyze pattern");
                    return false;
                }
            };
            !contains_trailing_assertion(&hir)
        })
    }
}

fn contains_trailing_assertion(hir: &Hir) -> bool {
    let mut stack = vec![hir];
    while let Some(cur) = stack.pop() {
        match cur.kind() {
            HirKind::Look(look) => {
                if !matches!(look, Look::Start | Look::StartLF | Look::StartCRLF) {
                    return true;
                }
            }
            HirKind::Repetition(rep) => stack.push(&rep.sub),
            HirKind::Capture(cap) => stack.push(&cap.sub),
            HirKind::Concat(subs) | HirKind::Alternation(subs) => stack.extend(subs.iter()),
            HirKind::Empty | HirKind::Literal(_) | HirKind::Class(_) => {}
        }
    }
    false
}

impl Matcher for RegexMatcher {
    fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    fn excludes_prefix(&self, prefix: &str) -> bool {
        if self.regex.as_str().is_empty() || !self.regex.is_match(prefix) {
            return false;
        }
        self.prefix_stable()
    }
}

impl fmt::Display for RegexMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Inverted regex match: {:?}", self.regex.as_str())
    }
}

/// Excludes a path when any of its sub-matchers does.
#[derive(Default)]
pub struct MultiMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl MultiMatcher {
    /// Compile every pattern; the first invalid one is reported.
    pub fn parse<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();
        for pattern in patterns {
            matchers.push(Box::new(RegexMatcher::new(pattern.as_ref())?));
        }
        Ok(Self { matchers })
    }

    /// [`DEFAULT_EXCLUDES`] followed by `extra`.
    pub fn with_defaults<I, S>(extra: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut all: Vec<String> = DEFAULT_EXCLUDES.iter().map(|p| p.to_string()).collect();
        all.extend(extra.into_iter().map(|p| p.as_ref().to_string()));
        Self::parse(all)
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl Matcher for MultiMatcher {
    fn matches(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }

    fn excludes_prefix(&self, prefix: &str) -> bool {
        self.matchers.iter().any(|m| m.excludes_prefix(prefix))
    }
}

impl fmt::Display for MultiMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, matcher) in self.matchers.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{matcher}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for MultiMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiMatcher")
            .field("len", &self.matchers.len())
            .finish()
    }
}

/// Normalize a relative path for matching.
///
/// Strips a leading `./` and gives directories a trailing `/`, so patterns
/// such as `(^|/)\.git/` see `.git/` for the directory itself.
pub fn normalize(path: &str, is_dir: bool) -> String {
    let path = path.strip_prefix("./").unwrap_or(path);
    let mut out = path.replace('\\', "/");
    if is_dir && !out.ends_with('/') {
        out.push('/');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_dir_is_prunable() {
        let m = RegexMatcher::new(r"(^|/)\.git/").unwrap();
        assert!(m.excludes_prefix(".git/"));
        assert!(m.excludes_prefix("vendor/.git/"));
        assert!(!m.excludes_prefix("src/"));
    }

    #[test]
    fn test_end_anchor_blocks_pruning() {
        let m = RegexMatcher::new("foo$").unwrap();
        assert!(m.matches("foo"));
        assert!(!m.excludes_prefix("foo"));
    }

    #[test]
    fn test_other_trailing_assertions_block_pruning() {
        for pattern in [r"foo\z", r"foo\b", r"(foo$)|(baz$)", r"(?m)foo$", r"foo\B"] {
            let m = RegexMatcher::new(pattern).unwrap();
            assert!(!m.excludes_prefix("foo"), "{pattern} must not prune");
        }
    }

    #[test]
    fn test_start_anchors_are_fine() {
        let m = RegexMatcher::new(r"(?m)^build/").unwrap();
        assert!(m.excludes_prefix("build/"));
    }

    #[test]
    fn test_empty_pattern_never_prunes() {
        let m = RegexMatcher::new("").unwrap();
        assert!(m.matches("anything"));
        assert!(!m.excludes_prefix("anything/"));
    }

    #[test]
    fn test_invalid_pattern_is_reported_at_construction() {
        let err = MultiMatcher::parse(["ok/", "(unclosed"]).unwrap_err();
        assert!(matches!(err, DocsError::Pattern { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn test_multi_matcher_any_semantics() {
        let m = MultiMatcher::parse([r"(^|/)vendor/", r"\.swp$"]).unwrap();
        assert!(m.excludes_prefix("vendor/"));
        assert!(!m.excludes_prefix("pkg/"));
        assert!(m.matches("pkg/file.go.swp"));
        assert!(!m.excludes_prefix("pkg/file.go.swp"));
    }

    #[test]
    fn test_defaults_prune_vcs_and_node_modules() {
        let m = MultiMatcher::with_defaults(Vec::<String>::new()).unwrap();
        assert_eq!(m.len(), DEFAULT_EXCLUDES.len());
        assert!(m.excludes_prefix(".git/"));
        assert!(m.excludes_prefix("web/node_modules/"));
        assert!(!m.excludes_prefix("internal/"));
        assert!(m.matches("main.go~"));
        assert!(m.matches(".DS_Store"));
    }

    #[test]
    fn test_extra_patterns_follow_defaults() {
        let m = MultiMatcher::with_defaults([r"(^|/)testdata/"]).unwrap();
        assert_eq!(m.len(), DEFAULT_EXCLUDES.len() + 1);
        assert!(m.excludes_prefix("pkg/testdata/"));
        assert!(m.excludes_prefix(".git/"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("./.git", true), ".git/");
        assert_eq!(normalize("pkg/a/", true), "pkg/a/");
        assert_eq!(normalize("./main.go", false), "main.go");
    }

    #[test]
    fn test_display_lists_patterns() {
        let m = MultiMatcher::parse(["a", "b"]).unwrap();
        assert_eq!(m.to_string(), "Inverted regex match: \"a\"\nInverted regex match: \"b\"");
    }
}
