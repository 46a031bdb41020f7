//! Serve command implementation.
//!
//! Orchestrates the server lifecycle:
//! - Initial build (a failure is reported, the server still starts)
//! - Source watching with exclusion pruning
//! - Debounced, serialized rebuilds
//! - HTTP server over the published snapshot
//! - Graceful shutdown on Ctrl+C

use std::sync::Arc;
use std::time::Duration;

use gsd_docs::Corpus;
use tokio::signal;
use tokio::sync::oneshot;

use crate::config::GsdConfig;
use crate::error::{CliError, Result};
use crate::serve::{Debouncer, RebuildScheduler, SourceWatcher, server};
use crate::ui;

/// Execute the serve command.
pub async fn execute(config: GsdConfig) -> Result<()> {
    let corpus = Arc::new(Corpus::new(config.corpus_options())?);

    ui::info(&format!("Building documentation for {}...", config.path.display()));
    let initial = tokio::task::spawn_blocking({
        let corpus = corpus.clone();
        move || corpus.build()
    })
    .await
    .map_err(|e| CliError::Custom(format!("Build task failed: {}", e)))?;
    match initial {
        Ok(report) => ui::success(&format!(
            "Documented {} packages in {}",
            report.packages,
            ui::format_duration(report.duration)
        )),
        Err(err) => ui::warning(&format!(
            "Initial build failed: {}. Serving \"not built yet\" until a rebuild succeeds",
            err
        )),
    }

    let scheduler = RebuildScheduler::new({
        let corpus = corpus.clone();
        move || rebuild(&corpus)
    });
    let debouncer = Debouncer::new(Duration::from_millis(config.debounce_ms), scheduler);

    let (watcher, mut changes) = SourceWatcher::new(&config.path, corpus.matcher())?;
    ui::info(&format!(
        "Watching {} directories in {}",
        watcher.watched().len(),
        watcher.root().display()
    ));

    let listener = server::bind(&config.addr).await?;
    let url = format!("http://{}", listener.local_addr()?);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let mut server_handle = tokio::spawn(server::serve(listener, corpus.store(), async move {
        let _ = shutdown_rx.await;
    }));
    ui::success(&format!("Serving documentation at {}", url));

    if config.open {
        open_browser(&url);
    }

    ui::info("Press Ctrl+C to stop");

    let server_exit = loop {
        tokio::select! {
            Some(change) = changes.recv() => {
                tracing::debug!(path = %change.path().display(), "source changed");
                debouncer.touch();
            }

            _ = signal::ctrl_c() => {
                ui::info("Shutting down...");
                break None;
            }

            result = &mut server_handle => {
                ui::warning("Server task completed unexpectedly");
                break Some(result);
            }
        }
    };

    // stop watching first so no new rebuild gets scheduled
    watcher.close();
    debouncer.shutdown().await;

    let server_result = match server_exit {
        Some(result) => result,
        None => {
            let _ = shutdown_tx.send(());
            server_handle.await
        }
    };
    server_result.map_err(|e| CliError::Server(format!("Server task failed: {}", e)))??;

    ui::success("Server stopped");
    Ok(())
}

/// One rebuild; failures keep the previous snapshot and are only reported.
fn rebuild(corpus: &Corpus) {
    match corpus.build() {
        Ok(report) => ui::success(&format!(
            "Rebuilt {} packages in {}",
            report.packages,
            ui::format_duration(report.duration)
        )),
        Err(err) => ui::error(&format!("Rebuild failed, still serving the last good build: {}", err)),
    }
}

/// Open the server URL in the default browser.
///
/// Uses platform-specific commands:
/// - macOS: `open`
/// - Windows: `start`
/// - Linux: `xdg-open`
fn open_browser(url: &str) {
    use std::process::Command;

    let result = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", url]).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };

    match result {
        Ok(_) => ui::info(&format!("Opened browser at {}", url)),
        Err(e) => ui::warning(&format!("Failed to open browser: {}", e)),
    }
}
