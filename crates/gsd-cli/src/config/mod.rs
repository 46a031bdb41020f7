//! Configuration system for gsd with multi-source loading.
//!
//! Merges settings from CLI args, environment variables, and config files.
//! Priority: CLI > Environment > File > Defaults

mod defaults;
mod loading;
mod tests;
mod validation;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use defaults::*;
pub use loading::ConfigOverrides;

/// gsd configuration - loaded from gsd.json, `GSD_*` variables or CLI args.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GsdConfig {
    /// Root of the Go source tree
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Output directory for `gsd build`
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Exclusion patterns on top of the built-in ones
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,

    /// Listen address for `gsd serve`
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Document unexported types and functions
    #[serde(default)]
    pub include_unexported: bool,

    /// Open the browser when serving
    #[serde(default = "default_open")]
    pub open: bool,

    /// Quiet period before a rebuild, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for GsdConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            out_dir: default_out_dir(),
            excludes: Vec::new(),
            addr: default_addr(),
            include_unexported: false,
            open: default_open(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl GsdConfig {
    /// Generate example gsd.json content.
    pub fn example_config() -> String {
        serde_json::to_string_pretty(&Self {
            excludes: vec![r"(^|/)testdata/".to_string(), r"\.pb\.go$".to_string()],
            ..Self::default()
        })
        .expect("Example config serialization should never fail")
    }

    /// Corpus options for this configuration.
    pub fn corpus_options(&self) -> gsd_docs::CorpusOptions {
        gsd_docs::CorpusOptions {
            root: self.path.clone(),
            include_unexported: self.include_unexported,
            excludes: self.excludes.clone(),
        }
    }
}
