//! Live documentation server.
//!
//! - [`watcher`] reports source changes, pruning excluded directories
//! - [`debounce`] turns bursts of changes into serialized rebuilds
//! - [`server`] answers requests from the published snapshot

pub mod debounce;
pub mod server;
pub mod watcher;

pub use debounce::{Debouncer, RebuildScheduler};
pub use watcher::{FileChange, SourceWatcher};
