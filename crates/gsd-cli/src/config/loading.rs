use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
    value::{Uncased, UncasedStr},
};
use serde::Serialize;

use crate::config::{CONFIG_FILE, GsdConfig};
use crate::error::{ConfigError, Result};

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_unexported: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
    /// Appended to the configured patterns rather than replacing them.
    #[serde(skip)]
    pub excludes: Vec<String>,
}

impl GsdConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(overrides: &ConfigOverrides, config_path: Option<&Path>) -> Result<Self> {
        Self::figment(overrides, config_path)?
            .extract::<Self>()
            .map(|mut config| {
                config.excludes.extend(overrides.excludes.iter().cloned());
                config
            })
            .map_err(|e| {
                ConfigError::InvalidValue {
                    field: "configuration".to_string(),
                    value: e.to_string(),
                    hint: "Check gsd.json syntax and field types".to_string(),
                }
                .into()
            })
    }

    fn figment(overrides: &ConfigOverrides, config_path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        // An explicit --config must exist; the default file is optional
        let config_file = match config_path {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::NotFound(path.to_path_buf()).into());
            }
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default_path = Path::new(CONFIG_FILE);
                default_path.exists().then(|| default_path.to_path_buf())
            }
        };

        if let Some(path) = config_file {
            tracing::debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Json::file(path));
        }

        figment = figment.merge(Env::prefixed("GSD_").map(|key| env_field(key)).lowercase(false));

        Ok(figment.merge(Serialized::defaults(overrides)))
    }
}

/// `GSD_*` variables naming multi-word fields.
const ENV_FIELDS: &[(&str, &str)] = &[
    ("OUT_DIR", "outDir"),
    ("INCLUDE_UNEXPORTED", "includeUnexported"),
    ("DEBOUNCE_MS", "debounceMs"),
];

/// Field name for a `GSD_`-stripped variable name.
pub(crate) fn env_field(key: &UncasedStr) -> Uncased<'static> {
    ENV_FIELDS
        .iter()
        .find(|(var, _)| var.eq_ignore_ascii_case(key.as_str()))
        .map_or_else(
            || key.as_str().to_ascii_lowercase().into(),
            |(_, field)| (*field).into(),
        )
}
