use std::fs;
use std::path::Path;

use gsd_docs::{BuildState, Corpus, CorpusOptions, Package, SourceDiscovery};

const MODULE: &str = "example.com/app";

/// Lists a fixed set of packages instead of asking the Go toolchain.
struct TreeDiscovery(Vec<Package>);

impl SourceDiscovery for TreeDiscovery {
    fn discover(&self, _root: &Path) -> gsd_docs::Result<Vec<Package>> {
        Ok(self.0.clone())
    }
}

fn write_package(root: &Path, rel: &str, name: &str, body: &str) -> Package {
    let dir = root.join(rel);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{name}.go")), body).unwrap();

    let import_path = if rel.is_empty() {
        MODULE.to_string()
    } else {
        format!("{MODULE}/{rel}")
    };
    let mut pkg = Package::new(import_path, MODULE);
    pkg.dir = dir;
    pkg
}

fn fixture(root: &Path) -> Vec<Package> {
    vec![
        write_package(
            root,
            "",
            "app",
            "// Package app wires everything together.\npackage app\n\n// Run starts the app.\nfunc Run() error { return nil }\n",
        ),
        write_package(
            root,
            "a",
            "a",
            r#"// Package a is the first layer.
//
// @GSD:SUMMARY Layer A.
package a

// Store keeps values.
type Store struct {
	items map[string]int
}

// NewStore returns an empty store.
func NewStore() *Store { return &Store{items: map[string]int{}} }

// Get looks up a key.
func (s *Store) Get(key string) (int, bool) {
	v, ok := s.items[key]
	return v, ok
}

func (s *Store) grow() {}
"#,
        ),
        write_package(root, "a/b", "b", "// Package b is nested.\npackage b\n"),
        write_package(root, "c", "c", "package c\n\ntype hidden int\n"),
    ]
}

fn corpus(root: &Path, include_unexported: bool) -> Corpus {
    let mut options = CorpusOptions::new(root);
    options.include_unexported = include_unexported;
    Corpus::new(options)
        .unwrap()
        .with_discovery(TreeDiscovery(fixture(root)))
}

#[test]
fn builds_expected_forest() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = corpus(dir.path(), false);
    let report = corpus.build().unwrap();
    assert_eq!(report.roots, 1);

    let index = corpus.packages();
    assert_eq!(
        index[MODULE].sub_packages,
        vec![format!("{MODULE}/a"), format!("{MODULE}/c")]
    );
    assert_eq!(index[&format!("{MODULE}/a")].sub_packages, vec![format!("{MODULE}/a/b")]);
    assert_eq!(
        index[&format!("{MODULE}/a/b")].parent_import_path.as_deref(),
        Some("example.com/app/a")
    );
    assert_eq!(corpus.state(), BuildState::Idle);
}

#[test]
fn renders_pages_for_exported_declarations() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = corpus(dir.path(), false);
    corpus.build().unwrap();
    let snapshot = corpus.store().current().unwrap();

    for path in [
        "",
        "example.com/app",
        "example.com/app/Run.html",
        "example.com/app/a",
        "example.com/app/a/Store.html",
        "example.com/app/a/Store.NewStore.html",
        "example.com/app/a/Store.Get.html",
        "example.com/app/a/b",
        "example.com/app/c",
    ] {
        assert!(snapshot.get(path).is_some(), "missing page {path:?}");
    }
    assert!(snapshot.get("example.com/app/a/Store.grow.html").is_none());
    assert!(snapshot.get("example.com/app/c/hidden.html").is_none());

    let page = String::from_utf8(snapshot.get("example.com/app/a").unwrap().content.to_vec()).unwrap();
    assert!(page.contains("Package a is the first layer."));
    assert!(page.contains("marker-summary"));
    assert!(page.contains(r#"href="/example.com/app/a/Store.html""#));

    let index = String::from_utf8(snapshot.get("").unwrap().content.to_vec()).unwrap();
    assert!(index.contains("Layer A."));
}

#[test]
fn unexported_pages_when_requested() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = corpus(dir.path(), true);
    corpus.build().unwrap();
    let store = corpus.store();
    assert!(store.get("example.com/app/a/Store.grow.html").is_some());
    assert!(store.get("example.com/app/c/hidden.html").is_some());
}

#[test]
fn broken_source_keeps_last_good_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = corpus(dir.path(), false);
    corpus.build().unwrap();
    let before: Vec<(String, Vec<u8>)> = {
        let snap = corpus.store().current().unwrap();
        snap.paths()
            .into_iter()
            .map(|p| (p.to_string(), snap.get(p).unwrap().content.to_vec()))
            .collect()
    };

    fs::write(dir.path().join("a/broken.go"), "package a\n\nfunc Broken() {\n").unwrap();
    let err = corpus.build().unwrap_err();
    assert!(err.to_string().contains("example.com/app/a"));
    assert_eq!(corpus.state(), BuildState::Failed);

    let snap = corpus.store().current().unwrap();
    let after: Vec<(String, Vec<u8>)> = snap
        .paths()
        .into_iter()
        .map(|p| (p.to_string(), snap.get(p).unwrap().content.to_vec()))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn snapshot_writes_static_site() {
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let corpus = corpus(dir.path(), false);
    corpus.build().unwrap();

    corpus.store().current().unwrap().write_to(out.path()).unwrap();
    assert!(out.path().join("index.html").is_file());
    assert!(out.path().join("example.com/app/a/index.html").is_file());
    assert!(out.path().join("example.com/app/a/Store.Get.html").is_file());
}

#[test]
fn readmes_values_and_examples_are_published() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let corpus = corpus(root, false);
    fs::write(root.join("README.md"), "# App\n\nStart here.").unwrap();
    fs::create_dir_all(root.join("docs")).unwrap();
    fs::write(root.join("docs/README.md"), "# Design notes").unwrap();
    fs::write(
        root.join("a/limits.go"),
        "package a\n\n// MaxItems caps a Store.\nconst MaxItems = 64\n",
    )
    .unwrap();
    fs::write(
        root.join("a/store_test.go"),
        r#"package a_test

import "fmt"

func ExampleStore_Get() {
	fmt.Println(1)
	// Output: 1
}
"#,
    )
    .unwrap();

    corpus.build().unwrap();
    let snapshot = corpus.store().current().unwrap();
    let page = |path: &str| String::from_utf8(snapshot.get(path).unwrap().content.to_vec()).unwrap();

    assert!(page("").contains("Start here."));
    assert!(page("docs").contains("<h1>Design notes</h1>"));

    let package = page("example.com/app/a");
    assert!(package.contains("const MaxItems = 64"));
    assert!(package.contains("MaxItems caps a Store."));

    let method = page("example.com/app/a/Store.Get.html");
    assert!(method.contains("fmt.Println(1)"));
    assert!(method.contains(r#"<pre class="output"><code>1</code></pre>"#));
}
