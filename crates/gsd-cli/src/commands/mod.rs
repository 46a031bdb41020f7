//! Command implementations for the gsd CLI.
//!
//! - [`build`] - Render documentation to an output directory
//! - [`serve`] - Serve documentation with live rebuilds
//!
//! Both commands receive a loaded and validated [`GsdConfig`]; [`run`]
//! does the loading from parsed arguments.

pub mod build;
pub mod serve;

use crate::cli::{Cli, Command};
use crate::config::{ConfigOverrides, GsdConfig};
use crate::error::Result;

pub use build::execute as build_execute;
pub use serve::execute as serve_execute;

/// Configuration overrides carried by the command line.
pub fn overrides(cli: &Cli) -> ConfigOverrides {
    let mut overrides = ConfigOverrides {
        path: cli.path.clone(),
        excludes: cli.exclude.clone(),
        ..ConfigOverrides::default()
    };

    match &cli.command {
        Command::Build(args) => {
            overrides.out_dir = args.out_dir.clone();
            overrides.include_unexported = args.unexported.then_some(true);
        }
        Command::Serve(args) => {
            overrides.addr = args.http.clone();
            overrides.open = args.open_flag();
            overrides.include_unexported = args.unexported.then_some(true);
            overrides.debounce_ms = args.debounce_ms;
        }
    }

    overrides
}

/// Load configuration for `cli` and run its subcommand.
pub async fn run(cli: Cli) -> Result<()> {
    let config = GsdConfig::load(&overrides(&cli), cli.config.as_deref())?;
    config.validate()?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Command::Build(_) => build_execute(config).await,
        Command::Serve(_) => serve_execute(config).await,
    }
}
