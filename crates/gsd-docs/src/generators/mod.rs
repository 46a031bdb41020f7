//! Page addressing and rendering.
//!
//! Every page in a snapshot is addressed by a virtual path derived from the
//! package import path:
//!
//! | page | virtual path |
//! |------|--------------|
//! | index | `` |
//! | package | `importPath` |
//! | type | `importPath/Type.html` |
//! | method or constructor | `importPath/Type.Func.html` |
//! | package-level function | `importPath/Func.html` |
//! | README of a non-package directory | `dir` relative to the root |

pub mod html;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::{FuncDoc, PackageIndex, TypeDoc, ValueDoc};
use crate::readme::Readme;

pub use html::HtmlRenderer;

/// What a page documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Index,
    Package,
    Type,
    Function,
    Readme,
}

/// One page to render, located by import path and declaration names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTarget {
    pub kind: PageKind,
    pub import_path: String,
    pub type_name: Option<String>,
    pub func_name: Option<String>,
}

impl PageTarget {
    pub fn index() -> Self {
        Self {
            kind: PageKind::Index,
            import_path: String::new(),
            type_name: None,
            func_name: None,
        }
    }

    pub fn package(import_path: &str) -> Self {
        Self {
            kind: PageKind::Package,
            import_path: import_path.to_string(),
            type_name: None,
            func_name: None,
        }
    }

    pub fn type_page(import_path: &str, type_name: &str) -> Self {
        Self {
            kind: PageKind::Type,
            import_path: import_path.to_string(),
            type_name: Some(type_name.to_string()),
            func_name: None,
        }
    }

    /// A function page, attached to `type_name` for methods and constructors.
    pub fn function(import_path: &str, type_name: Option<&str>, func_name: &str) -> Self {
        Self {
            kind: PageKind::Function,
            import_path: import_path.to_string(),
            type_name: type_name.map(str::to_string),
            func_name: Some(func_name.to_string()),
        }
    }

    /// The README page of a directory that holds no package.
    pub fn readme(dir: &str) -> Self {
        Self {
            kind: PageKind::Readme,
            import_path: dir.to_string(),
            type_name: None,
            func_name: None,
        }
    }

    /// Snapshot key for this page.
    pub fn virtual_path(&self) -> String {
        match self.kind {
            PageKind::Index => String::new(),
            PageKind::Package | PageKind::Readme => package_path(&self.import_path),
            PageKind::Type => type_path(&self.import_path, self.type_name.as_deref().unwrap_or_default()),
            PageKind::Function => func_path(
                &self.import_path,
                self.type_name.as_deref(),
                self.func_name.as_deref().unwrap_or_default(),
            ),
        }
    }
}

pub fn package_path(import_path: &str) -> String {
    import_path.to_string()
}

pub fn type_path(import_path: &str, type_name: &str) -> String {
    format!("{import_path}/{type_name}.html")
}

pub fn func_path(import_path: &str, type_name: Option<&str>, func_name: &str) -> String {
    match type_name {
        Some(type_name) => format!("{import_path}/{type_name}.{func_name}.html"),
        None => format!("{import_path}/{func_name}.html"),
    }
}

/// Shared, read-only inputs for rendering every page of one build.
#[derive(Debug)]
pub struct RenderContext<'a> {
    pub index: &'a PackageIndex,
    pub roots: &'a [String],
    /// Sidebar markup produced by [`crate::tree::display_tree`].
    pub sidebar: String,
    /// READMEs found below the root; the root's own has an empty `dir`.
    pub readmes: &'a [Readme],
    pub include_unexported: bool,
    pub generated_at: DateTime<Utc>,
}

impl RenderContext<'_> {
    pub fn type_visible(&self, ty: &TypeDoc) -> bool {
        self.include_unexported || ty.exported()
    }

    pub fn func_visible(&self, func: &FuncDoc) -> bool {
        self.include_unexported || func.exported()
    }

    pub fn value_visible(&self, value: &ValueDoc) -> bool {
        self.include_unexported || value.exported()
    }

    pub fn readme(&self, dir: &str) -> Option<&Readme> {
        self.readmes.iter().find(|r| r.dir == dir)
    }

    /// Every page of the corpus, honoring declaration visibility.
    pub fn targets(&self) -> Vec<PageTarget> {
        let mut targets = vec![PageTarget::index()];
        for (import_path, package) in self.index {
            targets.push(PageTarget::package(import_path));
            for ty in package.declarations.types.iter().filter(|t| self.type_visible(t)) {
                targets.push(PageTarget::type_page(import_path, &ty.name));
                for func in ty.all_funcs().filter(|f| self.func_visible(f)) {
                    targets.push(PageTarget::function(import_path, Some(&ty.name), &func.name));
                }
            }
            for func in package.declarations.funcs.iter().filter(|f| self.func_visible(f)) {
                targets.push(PageTarget::function(import_path, None, &func.name));
            }
        }
        // a package at the same path wins
        for readme in self.readmes {
            if !readme.dir.is_empty() && !self.index.contains_key(&readme.dir) {
                targets.push(PageTarget::readme(&readme.dir));
            }
        }
        targets
    }
}

/// Produces the bytes of one page.
pub trait PageRenderer: Send + Sync {
    fn render(&self, ctx: &RenderContext<'_>, target: &PageTarget) -> Result<Vec<u8>>;
}
