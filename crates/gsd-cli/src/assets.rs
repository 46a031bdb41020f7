//! Stylesheet, script and favicon shipped inside the binary.

use std::fs;
use std::path::{Path, PathBuf};

use rust_embed::RustEmbed;

use crate::error::{Result, ResultExt};

#[derive(RustEmbed)]
#[folder = "assets"]
struct StaticAssets;

/// An embedded file ready to serve.
#[derive(Debug, Clone)]
pub struct Asset {
    pub data: Vec<u8>,
    pub content_type: &'static str,
}

/// Look up an embedded file by its site-relative path, e.g. `_static/style.css`.
pub fn get(path: &str) -> Option<Asset> {
    let file = StaticAssets::get(path)?;
    Some(Asset {
        data: file.data.into_owned(),
        content_type: content_type_for(path),
    })
}

/// Write every embedded file below `dir`, returning the files written.
pub fn write_to(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for name in StaticAssets::iter() {
        let Some(file) = StaticAssets::get(&name) else {
            continue;
        };
        let target = dir.join(name.as_ref());
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).context(format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&target, file.data.as_ref())
            .context(format!("Failed to write {}", target.display()))?;
        written.push(target);
    }
    Ok(written)
}

/// Determine content type from file extension.
pub fn content_type_for(path: &str) -> &'static str {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    match extension {
        "css" => "text/css; charset=utf-8",
        "js" => "text/javascript; charset=utf-8",
        "html" => "text/html; charset=utf-8",
        "json" => "application/json",
        "ico" => "image/x-icon",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_files() {
        let css = get("_static/style.css").unwrap();
        assert_eq!(css.content_type, "text/css; charset=utf-8");
        assert!(String::from_utf8(css.data).unwrap().contains(".marker"));

        let ico = get("favicon.ico").unwrap();
        assert_eq!(ico.content_type, "image/x-icon");
        assert_eq!(&ico.data[..4], &[0, 0, 1, 0]);

        assert!(get("_static/missing.js").is_none());
    }

    #[test]
    fn test_write_to() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_to(dir.path()).unwrap();
        assert_eq!(written.len(), 3);
        assert!(dir.path().join("_static/gsd.js").is_file());
        assert!(dir.path().join("favicon.ico").is_file());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a/b.js"), "text/javascript; charset=utf-8");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
