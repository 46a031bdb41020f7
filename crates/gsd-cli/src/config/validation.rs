use gsd_docs::{DocsError, MultiMatcher};

use crate::cli::parse_addr;
use crate::config::GsdConfig;
use crate::error::{ConfigError, Result};

impl GsdConfig {
    /// Validate configuration before any work starts.
    ///
    /// Exclusion patterns are compiled here so a typo fails at startup
    /// instead of on the first rebuild.
    pub fn validate(&self) -> Result<()> {
        if !self.path.is_dir() {
            return Err(ConfigError::PathNotFound(self.path.clone()).into());
        }

        if let Err(hint) = parse_addr(&self.addr) {
            return Err(ConfigError::InvalidValue {
                field: "addr".to_string(),
                value: self.addr.clone(),
                hint,
            }
            .into());
        }

        if self.debounce_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "debounceMs".to_string(),
                value: "0".to_string(),
                hint: "Use a quiet period of at least 1 millisecond".to_string(),
            }
            .into());
        }

        match MultiMatcher::parse(&self.excludes) {
            Ok(_) => Ok(()),
            Err(DocsError::Pattern { pattern, source }) => Err(ConfigError::InvalidPattern {
                pattern,
                message: source.to_string(),
            }
            .into()),
            Err(other) => Err(other.into()),
        }
    }
}
