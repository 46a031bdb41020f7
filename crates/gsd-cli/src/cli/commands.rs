use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::validation::{parse_addr, parse_debounce};

/// Available gsd subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render documentation to static files
    ///
    /// Builds the documentation once and writes every page, plus the
    /// stylesheet and script, to the output directory.
    Build(BuildArgs),

    /// Serve documentation over HTTP with live rebuilds
    ///
    /// Watches the source tree and rebuilds the documentation whenever
    /// files change. Requests always see a complete build.
    Serve(ServeArgs),
}

/// Arguments for the build command
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Output directory for rendered pages
    ///
    /// Created if it doesn't exist. Defaults to `_book`.
    #[arg(short = 'o', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Also document unexported types and functions
    #[arg(long)]
    pub unexported: bool,
}

/// Arguments for the serve command
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to listen on
    ///
    /// Defaults to `localhost:3000`.
    ///
    /// Example: --http 0.0.0.0:8080
    #[arg(long, value_parser = parse_addr, value_name = "ADDR")]
    pub http: Option<String>,

    /// Open the browser once the server is listening
    #[arg(long, overrides_with = "no_open")]
    pub open: bool,

    /// Don't open the browser
    #[arg(long, overrides_with = "open")]
    pub no_open: bool,

    /// Also document unexported types and functions
    #[arg(long)]
    pub unexported: bool,

    /// Quiet period after the last file change before rebuilding
    #[arg(long, value_parser = parse_debounce, value_name = "MS")]
    pub debounce_ms: Option<u64>,
}

impl ServeArgs {
    /// The browser flag, if either form was given.
    pub fn open_flag(&self) -> Option<bool> {
        match (self.open, self.no_open) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
