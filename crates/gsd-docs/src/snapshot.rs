//! Immutable rendered page sets and their atomic publication.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::{DocsError, Result};
use crate::generators::{PageKind, PageTarget};

/// A rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub content: Arc<[u8]>,
    pub content_type: &'static str,
    pub kind: PageKind,
}

impl Page {
    pub fn html(content: Vec<u8>, kind: PageKind) -> Self {
        Self {
            content: content.into(),
            content_type: "text/html; charset=utf-8",
            kind,
        }
    }
}

/// Every page of one successful build, keyed by virtual path.
///
/// Built up with [`Snapshot::insert`] and never modified once published.
#[derive(Debug)]
pub struct Snapshot {
    pages: FxHashMap<String, Page>,
    generation: u64,
    built_at: DateTime<Utc>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            pages: FxHashMap::default(),
            generation: 0,
            built_at: Utc::now(),
        }
    }
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publication counter, 1 for the first published snapshot, 0 before publishing.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn insert(&mut self, target: &PageTarget, page: Page) {
        self.pages.insert(target.virtual_path(), page);
    }

    pub fn get(&self, path: &str) -> Option<&Page> {
        self.pages.get(path)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Virtual paths in sorted order.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.pages.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Write every page below `dir`, returning the files written.
    ///
    /// Package pages become `importPath/index.html`, the index page
    /// becomes `index.html`, other pages keep their virtual path.
    #[tracing::instrument(skip(self), fields(pages = self.pages.len()))]
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.pages.len());
        for path in self.paths() {
            let Some(page) = self.pages.get(path) else {
                continue;
            };
            let file = match page.kind {
                PageKind::Index => dir.join("index.html"),
                PageKind::Package | PageKind::Readme => dir.join(path).join("index.html"),
                PageKind::Type | PageKind::Function => dir.join(path),
            };
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent).map_err(|err| DocsError::io(parent, err))?;
            }
            fs::write(&file, &page.content).map_err(|err| DocsError::io(&file, err))?;
            written.push(file);
        }
        tracing::debug!(files = written.len(), dir = %dir.display(), "wrote snapshot");
        Ok(written)
    }
}

/// The currently published snapshot, shared between the builder and readers.
///
/// Cloning is cheap: clones observe the same publication.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    current: Arc<RwLock<Option<Arc<Snapshot>>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published snapshot in a single swap.
    /// Returns the generation assigned to `snapshot`.
    pub fn publish(&self, mut snapshot: Snapshot) -> u64 {
        let mut current = self.current.write();
        snapshot.generation = current.as_ref().map_or(1, |prev| prev.generation + 1);
        let generation = snapshot.generation;
        *current = Some(Arc::new(snapshot));
        generation
    }

    /// The published snapshot, if any build has succeeded yet.
    ///
    /// Hold on to the returned value to read several pages from the same build.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.read().clone()
    }

    pub fn get(&self, path: &str) -> Option<Page> {
        self.current()?.get(path).cloned()
    }

    pub fn is_built(&self) -> bool {
        self.current.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn snapshot(generation: u8, pages: &[&str]) -> Snapshot {
        let mut snap = Snapshot::new();
        for path in pages {
            snap.insert(
                &PageTarget::package(path),
                Page::html(vec![generation], PageKind::Package),
            );
        }
        snap
    }

    #[test]
    fn test_unbuilt_store() {
        let store = SnapshotStore::new();
        assert!(!store.is_built());
        assert!(store.get("").is_none());
        assert!(store.current().is_none());
    }

    #[test]
    fn test_publish_replaces_wholesale() {
        let store = SnapshotStore::new();
        assert_eq!(store.publish(snapshot(1, &["a", "b"])), 1);
        assert_eq!(store.publish(snapshot(2, &["a"])), 2);

        assert!(store.is_built());
        assert_eq!(store.current().unwrap().generation(), 2);
        assert_eq!(store.get("a").unwrap().content.as_ref(), &[2]);
        assert!(store.get("b").is_none());
    }

    #[test]
    fn test_held_snapshot_survives_publish() {
        let store = SnapshotStore::new();
        store.publish(snapshot(1, &["a"]));
        let held = store.current().unwrap();
        store.publish(snapshot(2, &["a"]));

        assert_eq!(held.get("a").unwrap().content.as_ref(), &[1]);
        assert_eq!(store.get("a").unwrap().content.as_ref(), &[2]);
    }

    #[test]
    fn test_readers_never_see_mixed_generations() {
        let store = SnapshotStore::new();
        store.publish(snapshot(0, &["a", "b", "c"]));

        let writer = {
            let store = store.clone();
            thread::spawn(move || {
                for generation in 1..=200u8 {
                    store.publish(snapshot(generation, &["a", "b", "c"]));
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..500 {
                        let snap = store.current().unwrap();
                        let first = snap.get("a").unwrap().content[0];
                        for path in ["b", "c"] {
                            assert_eq!(snap.get(path).unwrap().content[0], first);
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }

    #[test]
    fn test_write_to_layout() {
        let mut snap = Snapshot::new();
        snap.insert(&PageTarget::index(), Page::html(b"index".to_vec(), PageKind::Index));
        snap.insert(
            &PageTarget::package("example.com/app"),
            Page::html(b"pkg".to_vec(), PageKind::Package),
        );
        snap.insert(
            &PageTarget::type_page("example.com/app", "Client"),
            Page::html(b"type".to_vec(), PageKind::Type),
        );
        snap.insert(&PageTarget::readme("docs"), Page::html(b"readme".to_vec(), PageKind::Readme));

        let dir = tempfile::tempdir().unwrap();
        let written = snap.write_to(dir.path()).unwrap();
        assert_eq!(written.len(), 4);

        let read = |rel: &str| fs::read_to_string(dir.path().join(rel)).unwrap();
        assert_eq!(read("index.html"), "index");
        assert_eq!(read("example.com/app/index.html"), "pkg");
        assert_eq!(read("example.com/app/Client.html"), "type");
        assert_eq!(read("docs/index.html"), "readme");
        assert_eq!(
            snap.paths(),
            vec!["", "docs", "example.com/app", "example.com/app/Client.html"]
        );
    }
}
