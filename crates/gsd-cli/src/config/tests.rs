#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use serial_test::serial;

    use figment::value::UncasedStr;

    use crate::config::loading::env_field;
    use crate::config::*;
    use crate::error::{CliError, ConfigError};

    #[test]
    fn test_defaults() {
        let config = GsdConfig::default();
        assert_eq!(config.path, PathBuf::from("./"));
        assert_eq!(config.out_dir, PathBuf::from("_book"));
        assert_eq!(config.addr, "localhost:3000");
        assert!(config.open);
        assert!(!config.include_unexported);
        assert_eq!(config.debounce_ms, 100);
    }

    #[test]
    fn test_serialization() {
        let json_val = serde_json::to_value(GsdConfig::default()).unwrap();
        assert!(json_val.get("outDir").is_some());
        assert!(json_val.get("debounceMs").is_some());
        assert!(json_val.get("out_dir").is_none());
        // skip_serializing_if
        assert!(json_val.get("excludes").is_none());

        let example = GsdConfig::example_config();
        let config: GsdConfig = serde_json::from_str(&example).unwrap();
        assert_eq!(config.excludes.len(), 2);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(serde_json::from_str::<GsdConfig>(r#"{"outdir": "x"}"#).is_err());
    }

    #[test]
    fn test_env_field() {
        let field = |key: &str| env_field(UncasedStr::new(key)).as_str().to_string();
        assert_eq!(field("OUT_DIR"), "outDir");
        assert_eq!(field("debounce_ms"), "debounceMs");
        assert_eq!(field("ADDR"), "addr");
        assert_eq!(field("INCLUDE_UNEXPORTED"), "includeUnexported");
    }

    #[test]
    #[serial]
    fn test_multi_word_env_vars() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("GSD_OUT_DIR", "public");
            jail.set_env("GSD_INCLUDE_UNEXPORTED", "true");
            jail.set_env("GSD_OPEN", "false");

            let config = GsdConfig::load(&ConfigOverrides::default(), None).expect("config loads");
            assert_eq!(config.out_dir, PathBuf::from("public"));
            assert!(config.include_unexported);
            assert!(!config.open);
            Ok(())
        });
    }

    #[test]
    #[serial]
    fn test_unknown_env_var_rejected() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("GSD_OUTDIR", "public");
            let err = GsdConfig::load(&ConfigOverrides::default(), None).unwrap_err();
            assert!(matches!(err, CliError::Config(ConfigError::InvalidValue { .. })));
            Ok(())
        });
    }

    #[test]
    #[serial]
    fn test_layering() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "gsd.json",
                r#"{"outDir": "site", "addr": "0.0.0.0:9000", "excludes": ["gen/"]}"#,
            )?;
            jail.set_env("GSD_ADDR", "127.0.0.1:8000");
            jail.set_env("GSD_DEBOUNCE_MS", "250");

            let overrides = ConfigOverrides {
                open: Some(false),
                excludes: vec![r"\.pb\.go$".to_string()],
                ..Default::default()
            };
            let config = GsdConfig::load(&overrides, None).expect("config loads");

            // file
            assert_eq!(config.out_dir, PathBuf::from("site"));
            // env beats file
            assert_eq!(config.addr, "127.0.0.1:8000");
            assert_eq!(config.debounce_ms, 250);
            // cli beats defaults
            assert!(!config.open);
            // cli patterns are appended
            assert_eq!(config.excludes, vec!["gen/".to_string(), r"\.pb\.go$".to_string()]);
            Ok(())
        });
    }

    #[test]
    #[serial]
    fn test_cli_beats_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("GSD_ADDR", "127.0.0.1:8000");
            let overrides = ConfigOverrides {
                addr: Some("localhost:4000".to_string()),
                ..Default::default()
            };
            let config = GsdConfig::load(&overrides, None).expect("config loads");
            assert_eq!(config.addr, "localhost:4000");
            Ok(())
        });
    }

    #[test]
    #[serial]
    fn test_missing_explicit_config() {
        let err = GsdConfig::load(&ConfigOverrides::default(), Some(Path::new("/no/such/gsd.json")))
            .unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::NotFound(_))));
    }

    #[test]
    #[serial]
    fn test_bad_field_type() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("gsd.json", r#"{"debounceMs": "soon"}"#)?;
            let err = GsdConfig::load(&ConfigOverrides::default(), None).unwrap_err();
            assert!(matches!(err, CliError::Config(ConfigError::InvalidValue { .. })));
            Ok(())
        });
    }

    #[test]
    fn test_validation() {
        let dir = tempfile::tempdir().unwrap();
        let valid = GsdConfig {
            path: dir.path().to_path_buf(),
            ..GsdConfig::default()
        };
        assert!(valid.validate().is_ok());

        let missing_path = GsdConfig {
            path: dir.path().join("nope"),
            ..GsdConfig::default()
        };
        assert!(matches!(
            missing_path.validate(),
            Err(CliError::Config(ConfigError::PathNotFound(_)))
        ));

        let bad_addr = GsdConfig {
            addr: "localhost".to_string(),
            ..valid.clone()
        };
        assert!(bad_addr.validate().is_err());

        let bad_pattern = GsdConfig {
            excludes: vec!["(".to_string()],
            ..valid.clone()
        };
        assert!(matches!(
            bad_pattern.validate(),
            Err(CliError::Config(ConfigError::InvalidPattern { ref pattern, .. })) if pattern == "("
        ));

        let zero_debounce = GsdConfig {
            debounce_ms: 0,
            ..valid
        };
        assert!(zero_debounce.validate().is_err());
    }
}
