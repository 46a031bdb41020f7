#![deny(clippy::all)]
#![cfg(not(target_family = "wasm"))]
// gsd-docs is native-only: it shells out to the Go toolchain and reads sources with std::fs
#![allow(clippy::disallowed_methods)]

//! Documentation corpus for Go source trees.
//!
//! This crate provides:
//! - Package discovery through `go list` and a package tree built from import paths.
//! - A tree-sitter extractor for doc comments on packages, types, functions,
//!   constants, variables and test-file examples.
//! - README pages for the site root and directories without a package.
//! - `@GSD:NAME` annotations that wrap doc blocks in styled containers.
//! - Regex exclusion patterns that can prune whole directories.
//! - HTML page generation and atomically published snapshots for serving.

pub mod annotation;
pub mod corpus;
pub mod discovery;
pub mod error;
pub mod extractor;
pub mod generators;
pub mod markdown;
pub mod matcher;
pub mod model;
pub mod readme;
pub mod snapshot;
pub mod tree;

pub use corpus::{BuildReport, BuildState, Corpus, CorpusOptions};
pub use discovery::{GoListDiscovery, SourceDiscovery};
pub use error::{DocsError, Result};
pub use extractor::{GoSourceAnalyzer, PackageAnalyzer};
pub use generators::{HtmlRenderer, PageKind, PageRenderer, PageTarget, RenderContext};
pub use markdown::{Documentation, GfmMarkdown, MarkdownRenderer};
pub use matcher::{DEFAULT_EXCLUDES, Matcher, MultiMatcher, RegexMatcher};
pub use model::{Declarations, ExampleDoc, FuncDoc, Module, Package, PackageIndex, TypeDoc, TypeKind, ValueDoc};
pub use readme::{README_FILE_NAMES, Readme};
pub use snapshot::{Page, Snapshot, SnapshotStore};
