//! Build command implementation.
//!
//! Renders the documentation once and writes it, with the stylesheet,
//! script and favicon, to the configured output directory.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use gsd_docs::{BuildReport, Corpus};

use crate::assets;
use crate::config::GsdConfig;
use crate::error::{CliError, Result, ResultExt};
use crate::ui;

/// Execute the build command.
///
/// Any discovery, analysis or render failure ends the command with an
/// error; nothing is written in that case.
pub async fn execute(config: GsdConfig) -> Result<()> {
    let corpus = Arc::new(Corpus::new(config.corpus_options())?);

    let spinner = ui::Spinner::new(&format!(
        "Building documentation for {}...",
        config.path.display()
    ));

    let result = tokio::task::spawn_blocking({
        let corpus = corpus.clone();
        let out_dir = config.out_dir.clone();
        move || write_site(&corpus, &out_dir)
    })
    .await
    .map_err(|e| CliError::Custom(format!("Build task failed: {}", e)))?;

    match result {
        Ok((report, files)) => {
            spinner.finish(&format!(
                "Documented {} packages in {}",
                report.packages,
                ui::format_duration(report.duration)
            ));
            ui::print_build_summary(&report, files, &config.out_dir);
            Ok(())
        }
        Err(err) => {
            spinner.fail("Build failed");
            Err(err)
        }
    }
}

/// Build `corpus` and write the site below `out_dir`.
///
/// Returns the build report and the number of files written.
pub fn write_site(corpus: &Corpus, out_dir: &Path) -> Result<(BuildReport, usize)> {
    let report = corpus.build()?;
    let snapshot = corpus
        .store()
        .current()
        .ok_or_else(|| CliError::Custom("Build finished without publishing pages".to_string()))?;

    fs::create_dir_all(out_dir).context(format!(
        "Failed to create output directory {}",
        out_dir.display()
    ))?;
    let pages = snapshot.write_to(out_dir)?;
    let static_files = assets::write_to(out_dir)?;

    Ok((report, pages.len() + static_files.len()))
}
