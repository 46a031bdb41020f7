//! The build pipeline: discover, link, analyze, render, publish.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::discovery::{GoListDiscovery, SourceDiscovery};
use crate::error::Result;
use crate::extractor::{GoSourceAnalyzer, PackageAnalyzer, document_package};
use crate::generators::{HtmlRenderer, PageRenderer, RenderContext};
use crate::markdown::{GfmMarkdown, MarkdownRenderer};
use crate::matcher::{Matcher, MultiMatcher, normalize};
use crate::model::PackageIndex;
use crate::readme::{Readme, find_readmes};
use crate::snapshot::{Page, Snapshot, SnapshotStore};
use crate::tree::{build_tree, display_tree};

/// Where a corpus is in its build cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    Idle,
    Discovering,
    Analyzing,
    Rendering,
    Published,
    Failed,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Discovering => "discovering",
            Self::Analyzing => "analyzing",
            Self::Rendering => "rendering",
            Self::Published => "published",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Inputs that stay fixed for the life of a corpus.
#[derive(Debug, Clone)]
pub struct CorpusOptions {
    /// Source root handed to discovery.
    pub root: PathBuf,
    /// Render pages for unexported types and functions too.
    pub include_unexported: bool,
    /// Exclusion patterns on top of the defaults.
    pub excludes: Vec<String>,
}

impl CorpusOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include_unexported: false,
            excludes: Vec::new(),
        }
    }
}

/// Summary of a successful build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub packages: usize,
    pub roots: usize,
    pub pages: usize,
    /// Generation of the published snapshot.
    pub generation: u64,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

mod duration_ms {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u128(duration.as_millis())
    }
}

/// A documented source tree and its published pages.
///
/// Builds are serialized: a second caller of [`Corpus::build`] waits for the
/// first to finish. Readers go through [`Corpus::store`] and are never
/// blocked by a build.
pub struct Corpus {
    options: CorpusOptions,
    matcher: Arc<MultiMatcher>,
    discovery: Box<dyn SourceDiscovery>,
    analyzer: Box<dyn PackageAnalyzer>,
    renderer: Box<dyn PageRenderer>,
    markdown: Box<dyn MarkdownRenderer>,
    packages: RwLock<Arc<PackageIndex>>,
    state: RwLock<BuildState>,
    store: SnapshotStore,
    build_lock: Mutex<()>,
}

impl fmt::Debug for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Corpus")
            .field("options", &self.options)
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

impl Corpus {
    /// Corpus backed by `go list`, the Go source analyzer and HTML pages.
    ///
    /// Fails if an exclusion pattern does not compile.
    pub fn new(options: CorpusOptions) -> Result<Self> {
        let matcher = MultiMatcher::with_defaults(&options.excludes)?;
        Ok(Self {
            options,
            matcher: Arc::new(matcher),
            discovery: Box::new(GoListDiscovery::default()),
            analyzer: Box::new(GoSourceAnalyzer),
            renderer: Box::new(HtmlRenderer::new()?),
            markdown: Box::new(GfmMarkdown),
            packages: RwLock::new(Arc::new(PackageIndex::new())),
            state: RwLock::new(BuildState::Idle),
            store: SnapshotStore::new(),
            build_lock: Mutex::new(()),
        })
    }

    pub fn with_discovery(mut self, discovery: impl SourceDiscovery + 'static) -> Self {
        self.discovery = Box::new(discovery);
        self
    }

    pub fn with_analyzer(mut self, analyzer: impl PackageAnalyzer + 'static) -> Self {
        self.analyzer = Box::new(analyzer);
        self
    }

    pub fn with_renderer(mut self, renderer: impl PageRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn with_markdown(mut self, markdown: impl MarkdownRenderer + 'static) -> Self {
        self.markdown = Box::new(markdown);
        self
    }

    pub fn options(&self) -> &CorpusOptions {
        &self.options
    }

    /// Compiled exclusion patterns, shared with the file watcher.
    pub fn matcher(&self) -> Arc<MultiMatcher> {
        Arc::clone(&self.matcher)
    }

    pub fn store(&self) -> SnapshotStore {
        self.store.clone()
    }

    pub fn state(&self) -> BuildState {
        *self.state.read()
    }

    /// Packages of the last successful build.
    pub fn packages(&self) -> Arc<PackageIndex> {
        Arc::clone(&self.packages.read())
    }

    fn set_state(&self, state: BuildState) {
        tracing::trace!(%state, "build state");
        *self.state.write() = state;
    }

    /// Run the whole pipeline and publish the result.
    ///
    /// On error the state becomes [`BuildState::Failed`], the previously
    /// published snapshot stays in place and the error is returned.
    #[tracing::instrument(skip(self), fields(root = %self.options.root.display()))]
    pub fn build(&self) -> Result<BuildReport> {
        let _guard = self.build_lock.lock();
        let started = Instant::now();

        match self.run_pipeline() {
            Ok((index, snapshot, roots)) => {
                let packages = index.len();
                let pages = snapshot.len();
                let generation = self.store.publish(snapshot);
                let report = BuildReport {
                    packages,
                    roots,
                    pages,
                    generation,
                    duration: started.elapsed(),
                };
                *self.packages.write() = Arc::new(index);
                self.set_state(BuildState::Published);
                tracing::info!(
                    packages = report.packages,
                    pages = report.pages,
                    generation = report.generation,
                    elapsed_ms = report.duration.as_millis() as u64,
                    "published snapshot"
                );
                self.set_state(BuildState::Idle);
                Ok(report)
            }
            Err(err) => {
                self.set_state(BuildState::Failed);
                tracing::error!(error = %err, "build failed; keeping previous snapshot");
                Err(err)
            }
        }
    }

    fn run_pipeline(&self) -> Result<(PackageIndex, Snapshot, usize)> {
        self.set_state(BuildState::Discovering);
        let mut index = self.discover()?;
        let roots = build_tree(&mut index);

        self.set_state(BuildState::Analyzing);
        for package in index.values_mut() {
            let decls = self.analyzer.analyze(package)?;
            if !decls.doc.is_empty() {
                package.doc = decls.doc.clone();
            }
            if package.name.is_empty() {
                package.name = decls.name.clone();
            }
            package.declarations = decls;
            document_package(package, self.markdown.as_ref());
        }
        let readmes = self.readmes(&index)?;

        self.set_state(BuildState::Rendering);
        let ctx = RenderContext {
            index: &index,
            roots: &roots,
            sidebar: display_tree(&index, &roots),
            readmes: &readmes,
            include_unexported: self.options.include_unexported,
            generated_at: Utc::now(),
        };
        let mut snapshot = Snapshot::new();
        for target in ctx.targets() {
            let content = self.renderer.render(&ctx, &target)?;
            snapshot.insert(&target, Page::html(content, target.kind));
        }

        let root_count = roots.len();
        Ok((index, snapshot, root_count))
    }

    fn discover(&self) -> Result<PackageIndex> {
        let root = self.options.root.as_path();
        let base = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

        let mut index = PackageIndex::new();
        for package in self.discovery.discover(root)? {
            if self.is_excluded(root, &package.dir) || self.is_excluded(&base, &package.dir) {
                tracing::debug!(package = %package.import_path, "excluded package");
                continue;
            }
            index.insert(package.import_path.clone(), package);
        }
        tracing::debug!(count = index.len(), "package index replaced");
        Ok(index)
    }

    /// READMEs for the index page and for directories that hold no package.
    fn readmes(&self, index: &PackageIndex) -> Result<Vec<Readme>> {
        let root = self.options.root.as_path();
        let base = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let package_dirs: FxHashSet<String> = index
            .values()
            .filter_map(|package| {
                package
                    .dir
                    .strip_prefix(root)
                    .or_else(|_| package.dir.strip_prefix(&base))
                    .ok()
                    .map(|rel| normalize(&rel.to_string_lossy(), false))
            })
            .collect();

        let readmes = find_readmes(root, self.matcher.as_ref(), self.markdown.as_ref())?;
        Ok(readmes
            .into_iter()
            .filter(|readme| readme.dir.is_empty() || !package_dirs.contains(&readme.dir))
            .collect())
    }

    fn is_excluded(&self, base: &Path, dir: &Path) -> bool {
        let Ok(rel) = dir.strip_prefix(base) else {
            return false;
        };
        let rel = rel.to_string_lossy();
        !rel.is_empty() && self.matcher.matches(&normalize(&rel, true))
    }
}
