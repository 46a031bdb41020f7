//! Spinner for the one-shot build.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner shown while a build runs.
///
/// Hidden when stderr is not a terminal or when running in CI, so piped
/// output only carries the final status line.
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    /// Create and start a new spinner.
    pub fn new(message: &str) -> Self {
        let pb = if super::spinners_enabled() {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_strings(&["◐", "◓", "◑", "◒", "●"]));
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// Update spinner message while it's running.
    pub fn set_message(&self, message: &str) {
        self.pb.set_message(message.to_string());
    }

    /// Finish with a green check mark.
    pub fn finish(&self, message: &str) {
        self.pb.finish_and_clear();
        super::success(message);
    }

    /// Finish with a red cross.
    pub fn fail(&self, message: &str) {
        self.pb.finish_and_clear();
        super::error(message);
    }
}
