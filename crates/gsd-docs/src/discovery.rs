//! Package discovery through the Go toolchain.

use std::path::Path;
use std::process::Command;

use crate::error::{DocsError, Result};
use crate::model::Package;

/// Lists the packages below a source root.
pub trait SourceDiscovery: Send + Sync {
    fn discover(&self, root: &Path) -> Result<Vec<Package>>;
}

/// Runs `go list -json <pattern>` in the source root.
#[derive(Debug, Clone)]
pub struct GoListDiscovery {
    program: String,
    pattern: String,
}

impl Default for GoListDiscovery {
    fn default() -> Self {
        Self {
            program: "go".to_string(),
            pattern: "./...".to_string(),
        }
    }
}

impl GoListDiscovery {
    /// Use a different executable than `go` from `PATH`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl SourceDiscovery for GoListDiscovery {
    #[tracing::instrument(skip(self), fields(pattern = %self.pattern))]
    fn discover(&self, root: &Path) -> Result<Vec<Package>> {
        let output = Command::new(&self.program)
            .args(["list", "-json", &self.pattern])
            .current_dir(root)
            .output()
            .map_err(|err| DocsError::Discovery {
                message: format!("failed to run '{} list': {err}", self.program),
            })?;

        if !output.status.success() {
            return Err(DocsError::Discovery {
                message: format!(
                    "'{} list' exited unsuccessfully: {}\n{}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim_end()
                ),
            });
        }

        let packages = decode_package_stream(&output.stdout)?;
        tracing::debug!(count = packages.len(), "discovered packages");
        Ok(packages)
    }
}

/// Decode the concatenated JSON objects printed by `go list -json`.
pub fn decode_package_stream(bytes: &[u8]) -> Result<Vec<Package>> {
    serde_json::Deserializer::from_slice(bytes)
        .into_iter::<Package>()
        .map(|item| {
            item.map_err(|err| DocsError::Discovery {
                message: format!("cannot decode package list: {err}"),
            })
        })
        .collect()
}
