//! Formatting for durations and the build summary.

use std::path::Path;
use std::time::Duration;

use gsd_docs::BuildReport;
use owo_colors::OwoColorize;

/// Format duration in human-readable format.
///
/// ```
/// use std::time::Duration;
/// use gsd_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Print what a one-shot build produced.
pub fn print_build_summary(report: &BuildReport, files: usize, out_dir: &Path) {
    if !super::colors_enabled() {
        eprintln!(
            "{} packages, {} pages, {} files in {} -> {}",
            report.packages,
            report.pages,
            files,
            format_duration(report.duration),
            out_dir.display()
        );
        return;
    }

    eprintln!(
        "{} packages, {} pages, {} files in {} {} {}",
        report.packages.bold(),
        report.pages.bold(),
        files,
        format_duration(report.duration).dimmed(),
        "->".dimmed(),
        out_dir.display().cyan()
    );
}
