//! Logging setup built on `tracing`.
//!
//! - `--verbose` turns on debug output for the gsd crates
//! - `--quiet` keeps errors only
//! - otherwise `RUST_LOG` wins, falling back to info
//!
//! ```rust,no_run
//! use gsd_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!(packages = 12, "published snapshot");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "gsd=debug,gsd_docs=debug,gsd_cli=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str = "gsd=info,gsd_docs=info,gsd_cli=info";

/// Pick the filter for the given flags.
///
/// `RUST_LOG` is only consulted when neither flag is set.
pub fn build_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the global subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(build_filter(verbose, quiet), no_color);
}

/// Initialize logging with a custom filter.
///
/// ```rust,no_run
/// use gsd_cli::logger::init_logger_with_filter;
/// use tracing_subscriber::EnvFilter;
///
/// init_logger_with_filter(EnvFilter::new("gsd_docs=trace,notify=off"), false);
/// ```
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .with_writer(std::io::stderr)
        .compact();

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Whether log output should be colored.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` forces them, otherwise the
/// terminal decides.
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_verbose_filter() {
        let filter = build_filter(true, false).to_string();
        assert!(filter.contains("gsd_docs=debug"));
        assert!(filter.contains("gsd_cli=debug"));
    }

    #[test]
    fn test_quiet_filter() {
        assert_eq!(build_filter(false, true).to_string(), "error");
    }

    #[test]
    #[serial]
    fn test_rust_log_is_used_without_flags() {
        unsafe {
            std::env::set_var("RUST_LOG", "gsd_docs=trace");
        }
        assert_eq!(build_filter(false, false).to_string(), "gsd_docs=trace");
        unsafe {
            std::env::remove_var("RUST_LOG");
        }
        assert!(build_filter(false, false).to_string().contains("gsd_docs=info"));
    }

    #[test]
    #[serial]
    fn test_no_color_wins() {
        unsafe {
            std::env::set_var("NO_COLOR", "1");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(!should_use_colors());
        unsafe {
            std::env::remove_var("NO_COLOR");
        }
        assert!(should_use_colors());
        unsafe {
            std::env::remove_var("FORCE_COLOR");
        }
    }

    #[test]
    fn test_double_init_is_harmless() {
        init_logger(false, true, true);
        init_logger(true, false, true);
    }
}
