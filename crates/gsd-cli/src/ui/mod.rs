//! Terminal output for humans: status lines, spinners and summaries.
//!
//! Logs go through `tracing`; this module is for the handful of lines a
//! user is meant to read, like where the site was written or which URL
//! is being served.
//!
//! ```no_run
//! use gsd_cli::ui;
//!
//! ui::init_colors(false);
//! let spinner = ui::Spinner::new("Building documentation...");
//! spinner.finish("Built 12 packages");
//! ui::success("Wrote _book");
//! ```

mod format;
mod messages;
mod spinner;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration, print_build_summary};
pub use messages::{error, info, success, warning};
pub use spinner::Spinner;

static COLORS: AtomicBool = AtomicBool::new(true);

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS"]
        .iter()
        .any(|var| std::env::var(var).is_ok())
}

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR environment variables, falls back to
/// terminal capability detection.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }
    console::user_attended_stderr()
}

/// Decide once whether status lines are colored.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color && should_use_color();
    COLORS.store(enabled, Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}

/// Spinners only make sense on an interactive, non-CI terminal.
pub(crate) fn spinners_enabled() -> bool {
    !is_ci() && console::user_attended_stderr()
}
