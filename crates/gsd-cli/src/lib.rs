//! gsd CLI - documentation for Go source trees.
//!
//! This crate provides the command-line interface on top of `gsd-docs`:
//! a one-shot static build and a live server that rebuilds when sources
//! change.
//!
//! # Architecture
//!
//! - [`cli`] - Argument definitions (clap derive)
//! - [`config`] - Layered configuration: defaults, `gsd.json`, `GSD_*`, flags
//! - [`commands`] - `build` and `serve`
//! - [`serve`] - Watcher, debouncer and HTTP server
//! - [`error`] - Error types with actionable hints
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Status lines, spinner and build summary
//!
//! # Example
//!
//! ```rust,no_run
//! use gsd_cli::{config::GsdConfig, error::Result, logger};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     let config = GsdConfig {
//!         path: "./".into(),
//!         ..GsdConfig::default()
//!     };
//!     config.validate()?;
//!     gsd_cli::commands::build_execute(config).await
//! }
//! ```

pub mod assets;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod serve;
pub mod ui;

pub use error::{CliError, ConfigError, Result, ResultExt};
