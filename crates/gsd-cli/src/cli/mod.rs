//! Command-line interface definition for gsd.
//!
//! This module defines the complete CLI structure using clap v4's derive macros.
//!
//! # Command Structure
//!
//! - `gsd build` - Render the documentation site into an output directory
//! - `gsd serve` - Serve documentation and rebuild when sources change

mod commands;
mod validation;

use std::path::PathBuf;

use clap::Parser;

pub use commands::{BuildArgs, Command, ServeArgs};
pub use validation::{parse_addr, parse_debounce};

/// gsd - documentation for Go source trees
#[derive(Parser, Debug)]
#[command(
    name = "gsd",
    version,
    about = "Browse the documentation of a Go source tree",
    long_about = "gsd discovers the packages of a Go module, renders their doc comments\n\
                  as HTML pages and either writes them to disk or serves them, rebuilding\n\
                  whenever a source file changes."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Shows package discovery, analysis and watch events.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    ///
    /// Outputs plain text without ANSI color codes. Useful for logging to
    /// files or systems that don't support colored terminal output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Root of the Go source tree
    ///
    /// Package discovery runs in this directory. Defaults to `./`.
    #[arg(short, long, global = true, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Exclude paths matching a regular expression
    ///
    /// Applies on top of the built-in excludes (VCS directories, editor
    /// swap files, node_modules). May be repeated.
    ///
    /// Examples:
    ///   -e '(^|/)testdata/' -e '\.pb\.go$'
    #[arg(short, long, global = true, value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Path to a gsd.json configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
