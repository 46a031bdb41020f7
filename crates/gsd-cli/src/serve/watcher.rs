//! Source tree watcher with exclusion pruning.
//!
//! Every non-excluded directory gets its own non-recursive watch, so an
//! excluded subtree such as `node_modules/` never costs a watch handle.
//! Directories created or renamed into the tree later are walked and
//! watched the same way.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gsd_docs::matcher::{Matcher, MultiMatcher, normalize};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use walkdir::WalkDir;

use crate::error::{CliError, Result};

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// File was modified
    Modified(PathBuf),
    /// File was created
    Created(PathBuf),
    /// File was removed
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }

    /// Map a notify event kind onto a change, dropping metadata-only and access events.
    fn from_kind(kind: &EventKind, path: PathBuf) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(FileChange::Created(path)),
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Modify(_) => Some(FileChange::Modified(path)),
            EventKind::Remove(_) => Some(FileChange::Removed(path)),
            _ => None,
        }
    }
}

/// Watch handles and the directories they cover.
struct WatchSet {
    root: PathBuf,
    matcher: Arc<MultiMatcher>,
    watcher: Mutex<Option<RecommendedWatcher>>,
    watched: Mutex<BTreeSet<PathBuf>>,
}

impl WatchSet {
    fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        Some(rel.to_string_lossy().into_owned())
    }

    /// Whether nothing below `dir` can be included.
    fn is_pruned(&self, dir: &Path) -> bool {
        match self.relative(dir) {
            Some(rel) if !rel.is_empty() => self.matcher.excludes_prefix(&normalize(&rel, true)),
            Some(_) => false,
            None => true,
        }
    }

    fn is_excluded(&self, path: &Path, is_dir: bool) -> bool {
        match self.relative(path) {
            Some(rel) if !rel.is_empty() => self.matcher.matches(&normalize(&rel, is_dir)),
            Some(_) => false,
            None => true,
        }
    }

    /// Walk `dir`, registering a watch on every directory that survives pruning.
    fn watch_tree(&self, dir: &Path) -> notify::Result<usize> {
        let mut added = 0;
        let mut walker = WalkDir::new(dir).follow_links(false).into_iter();
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
            let path = entry.path();
            if self.is_pruned(path) {
                tracing::debug!(dir = %path.display(), "pruned excluded directory");
                walker.skip_current_dir();
                continue;
            }
            if self.watched.lock().contains(path) {
                continue;
            }

            let mut guard = self.watcher.lock();
            let Some(watcher) = guard.as_mut() else {
                // closed while walking
                return Ok(added);
            };
            watcher.watch(path, RecursiveMode::NonRecursive)?;
            drop(guard);

            self.watched.lock().insert(path.to_path_buf());
            added += 1;
        }
        Ok(added)
    }

    /// Drop every watch at or below `path`.
    fn forget(&self, path: &Path) {
        let gone: Vec<PathBuf> = {
            let mut watched = self.watched.lock();
            let gone = watched.iter().filter(|dir| dir.starts_with(path)).cloned().collect();
            watched.retain(|dir| !dir.starts_with(path));
            gone
        };
        if let Some(watcher) = self.watcher.lock().as_mut() {
            for dir in &gone {
                // inotify already dropped watches on deleted directories
                let _ = watcher.unwatch(dir);
            }
        }
    }

    /// Turn one raw event into the changes worth forwarding.
    ///
    /// Walks newly arrived directories, so this blocks on the filesystem.
    fn handle(&self, event: Event) -> Vec<FileChange> {
        let mut changes = Vec::new();
        for path in event.paths {
            let was_dir = self.watched.lock().contains(&path);
            let now_dir = path.is_dir();

            if self.is_excluded(&path, was_dir || now_dir) {
                continue;
            }

            match event.kind {
                EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(_)) if now_dir => {
                    match self.watch_tree(&path) {
                        Ok(added) => tracing::debug!(dir = %path.display(), added, "watching new directory"),
                        Err(err) => {
                            tracing::warn!(dir = %path.display(), error = %err, "failed to watch new directory")
                        }
                    }
                }
                EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_)) if was_dir => self.forget(&path),
                _ => {}
            }

            if let Some(change) = FileChange::from_kind(&event.kind, path) {
                changes.push(change);
            }
        }
        changes
    }

    fn close(&self) {
        // dropping the notify watcher releases every handle
        self.watcher.lock().take();
        self.watched.lock().clear();
    }
}

/// Watches a source tree and reports changes on a channel.
///
/// Must be created inside a tokio runtime: raw events are forwarded by a
/// spawned task and handled on the blocking pool.
pub struct SourceWatcher {
    set: Arc<WatchSet>,
    task: JoinHandle<()>,
}

impl SourceWatcher {
    /// Walk `root` and start watching.
    ///
    /// # Errors
    ///
    /// Returns error if the root doesn't exist or a watch can't be registered.
    pub fn new(
        root: &Path,
        matcher: Arc<MultiMatcher>,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        let root = root
            .canonicalize()
            .map_err(|_| CliError::FileNotFound(root.to_path_buf()))?;

        let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = raw_tx.send(res);
        })?;

        let set = Arc::new(WatchSet {
            root,
            matcher,
            watcher: Mutex::new(Some(watcher)),
            watched: Mutex::new(BTreeSet::new()),
        });
        let count = set.watch_tree(&set.root.clone())?;
        tracing::debug!(root = %set.root.display(), directories = count, "watch established");

        let (tx, rx) = mpsc::channel(100);
        let task = tokio::spawn({
            let set = set.clone();
            async move {
                while let Some(res) = raw_rx.recv().await {
                    let event = match res {
                        Ok(event) => event,
                        Err(err) => {
                            tracing::warn!(error = %err, "watch error");
                            continue;
                        }
                    };
                    let handled = tokio::task::spawn_blocking({
                        let set = set.clone();
                        move || set.handle(event)
                    })
                    .await;
                    let changes = match handled {
                        Ok(changes) => changes,
                        Err(err) => {
                            tracing::warn!(error = %err, "watch event handler failed");
                            continue;
                        }
                    };
                    for change in changes {
                        if tx.send(change).await.is_err() {
                            return;
                        }
                    }
                }
            }
        });

        Ok((Self { set, task }, rx))
    }

    /// Canonical root being watched.
    pub fn root(&self) -> &Path {
        &self.set.root
    }

    /// Directories currently holding a watch, sorted.
    pub fn watched(&self) -> Vec<PathBuf> {
        self.set.watched.lock().iter().cloned().collect()
    }

    /// Stop watching and release every handle.
    pub fn close(self) {}
}

impl Drop for SourceWatcher {
    fn drop(&mut self) {
        self.task.abort();
        self.set.close();
    }
}
