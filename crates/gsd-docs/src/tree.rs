//! Package hierarchy from import-path prefixes.
//!
//! Packages live in a flat [`PackageIndex`]. Children are referenced by
//! import path from `sub_packages`, parents by `parent_import_path`, so the
//! hierarchy never holds object references in both directions.

use std::fmt::Write;

use crate::model::PackageIndex;

/// Link every package to its nearest enclosing package and return the roots.
///
/// For each package below its module root, the import path is shortened one
/// segment at a time, down to the module root. The first shortened path that
/// names a known package becomes the parent. Import paths are unique keys, so
/// this is the longest proper prefix. Packages without such a prefix are
/// roots, returned in index order.
pub fn build_tree(index: &mut PackageIndex) -> Vec<String> {
    for pkg in index.values_mut() {
        pkg.parent_import_path = None;
        pkg.sub_packages.clear();
    }

    let mut links: Vec<(String, String)> = Vec::new();
    for pkg in index.values() {
        if pkg.is_module_root() {
            continue;
        }
        if let Some(parent) = find_parent(index, &pkg.import_path, pkg.module_path()) {
            links.push((pkg.import_path.clone(), parent.to_string()));
        }
    }

    for (child, parent) in links {
        if let Some(pkg) = index.get_mut(&parent) {
            pkg.sub_packages.push(child.clone());
        }
        if let Some(pkg) = index.get_mut(&child) {
            pkg.parent_import_path = Some(parent);
        }
    }

    index
        .values()
        .filter(|pkg| pkg.parent_import_path.is_none())
        .map(|pkg| pkg.import_path.clone())
        .collect()
}

fn find_parent<'a>(index: &PackageIndex, import_path: &'a str, module_path: &str) -> Option<&'a str> {
    // Outside its module the whole path is walkable.
    let floor = if import_path.starts_with(module_path) {
        module_path.len()
    } else {
        0
    };

    let mut candidate = import_path;
    while let Some(idx) = candidate.rfind('/') {
        candidate = &candidate[..idx];
        if candidate.len() < floor {
            break;
        }
        if index.contains_key(candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Chain of ancestors from the root down to (excluding) `import_path`.
pub fn ancestors(index: &PackageIndex, import_path: &str) -> Vec<String> {
    let mut chain = Vec::new();
    let mut cur = index
        .get(import_path)
        .and_then(|pkg| pkg.parent_import_path.clone());
    while let Some(path) = cur {
        cur = index.get(&path).and_then(|pkg| pkg.parent_import_path.clone());
        chain.push(path);
        if chain.len() > index.len() {
            break;
        }
    }
    chain.reverse();
    chain
}

/// Render the forest as nested lists for the sidebar.
pub fn display_tree(index: &PackageIndex, roots: &[String]) -> String {
    let mut buf = String::from("<ul>\n");
    write_level(&mut buf, index, roots);
    buf.push_str("</ul>\n");
    buf
}

fn write_level(buf: &mut String, index: &PackageIndex, level: &[String]) {
    for import_path in level {
        let Some(pkg) = index.get(import_path) else {
            continue;
        };
        let _ = write!(
            buf,
            "<li>\n<a href=\"/{path}\">{path}</a>\n",
            path = pkg.import_path
        );
        if !pkg.sub_packages.is_empty() {
            buf.push_str("<ul>\n");
            write_level(buf, index, &pkg.sub_packages);
            buf.push_str("</ul>\n");
        }
        buf.push_str("</li>\n");
    }
}
