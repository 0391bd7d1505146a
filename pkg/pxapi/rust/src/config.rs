// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::vis::VisCodec;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/pxapi/pxctl.yaml";
pub const CONFIG_ENV_VAR: &str = "PXCTL_CONFIG";

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    /// Run Vis validation on every conversion.
    #[serde(default = "default_true")]
    pub validate_vis: bool,
    /// JWK or PEM file used by the crypto commands when `--key` is absent.
    pub key_file: Option<PathBuf>,
    #[serde(default)]
    pub output: OutputFormat,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: None,
            validate_vis: true,
            key_file: None,
            output: OutputFormat::default(),
        }
    }
}

impl ToolConfig {
    pub fn vis_codec(&self) -> VisCodec {
        VisCodec::new(self.validate_vis)
    }

    pub fn log_config(&self) -> Result<px_log::LogConfig> {
        let mut config = px_log::LogConfig::new("PXCTL", &self.log_level)
            .with_context(|| format!("invalid log_level {:?}", self.log_level))?;
        config.file = self.log_file.clone();
        Ok(config)
    }
}

/// Where to read configuration from: the explicit path if given, else
/// `PXCTL_CONFIG`, else the default location.
pub fn config_path(explicit: Option<&Path>) -> (PathBuf, bool) {
    if let Some(path) = explicit {
        return (path.to_path_buf(), true);
    }
    match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) if !path.is_empty() => (PathBuf::from(path), true),
        _ => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    }
}

/// Where a loaded configuration came from.
///
/// Configuration is read before logging is set up, so the reason defaults
/// were used is handed back for the caller to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults(String),
}

/// Load the tool configuration.
///
/// A missing file at the default location yields defaults. A missing file
/// that was asked for explicitly (flag or env var) is an error.
pub fn load(explicit: Option<&Path>) -> Result<(ToolConfig, ConfigSource)> {
    let (path, required) = config_path(explicit);
    load_from(&path, required)
}

fn load_from(path: &Path, required: bool) -> Result<(ToolConfig, ConfigSource)> {
    if !required && !path.exists() {
        let reason = format!("no configuration at {}, using defaults", path.display());
        return Ok((ToolConfig::default(), ConfigSource::Defaults(reason)));
    }
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    if contents.trim().is_empty() {
        let reason = format!("{} is empty, using defaults", path.display());
        return Ok((ToolConfig::default(), ConfigSource::Defaults(reason)));
    }
    let config: ToolConfig =
        serde_yaml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
    Ok((config, ConfigSource::File(path.to_path_buf())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pxctl.yaml");
        let yaml = r#"
log_level: debug
log_file: /var/log/pxctl.log
validate_vis: false
key_file: /etc/pxapi/key.jwk
output: json
"#;
        fs::write(&path, yaml).unwrap();

        let (cfg, source) = load(Some(&path)).unwrap();
        assert_eq!(source, ConfigSource::File(path.clone()));
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.log_file.as_deref(), Some(Path::new("/var/log/pxctl.log")));
        assert!(!cfg.validate_vis);
        assert!(!cfg.vis_codec().validate);
        assert_eq!(cfg.key_file.as_deref(), Some(Path::new("/etc/pxapi/key.jwk")));
        assert_eq!(cfg.output, OutputFormat::Json);
    }

    #[test]
    fn test_parse_minimal_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pxctl.yaml");
        fs::write(&path, "output: pretty\n").unwrap();

        let (cfg, _) = load(Some(&path)).unwrap();
        assert_eq!(cfg, ToolConfig::default());
        assert!(cfg.validate_vis);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pxctl.yaml");
        fs::write(&path, "\n").unwrap();
        let (cfg, source) = load(Some(&path)).unwrap();
        assert_eq!(cfg, ToolConfig::default());
        assert!(matches!(source, ConfigSource::Defaults(reason) if reason.contains("is empty")));
    }

    #[test]
    fn test_missing_optional_file_reports_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pxctl.yaml");
        let (cfg, source) = load_from(&path, false).unwrap();
        assert_eq!(cfg, ToolConfig::default());
        match source {
            ConfigSource::Defaults(reason) => {
                assert!(reason.contains("no configuration at"));
                assert!(reason.contains("pxctl.yaml"));
            }
            ConfigSource::File(path) => panic!("unexpected file source {}", path.display()),
        }
        assert!(load_from(&path, true).is_err());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pxctl.yaml");
        fs::write(&path, "colour: blue\n").unwrap();
        let err = load(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        assert!(load(Some(&path)).is_err());
    }

    #[test]
    fn test_env_var_overrides_default_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("from-env.yaml");
        fs::write(&path, "log_level: warn\n").unwrap();

        temp_env::with_var(CONFIG_ENV_VAR, Some(&path), || {
            assert_eq!(config_path(None), (path.clone(), true));
            assert_eq!(load(None).unwrap().0.log_level, "warn");
        });

        let missing = dir.path().join("missing.yaml");
        temp_env::with_var(CONFIG_ENV_VAR, Some(&missing), || {
            assert!(load(None).is_err());
        });
    }

    #[test]
    fn test_default_path_when_unset() {
        temp_env::with_var_unset(CONFIG_ENV_VAR, || {
            assert_eq!(
                config_path(None),
                (PathBuf::from(DEFAULT_CONFIG_PATH), false)
            );
        });
    }

    #[test]
    fn test_log_config() {
        let cfg = ToolConfig {
            log_level: "trace".to_string(),
            log_file: Some(PathBuf::from("/tmp/pxctl.log")),
            ..Default::default()
        };
        let log = cfg.log_config().unwrap();
        assert_eq!(log.level, log::LevelFilter::Trace);
        assert_eq!(log.component, "PXCTL");
        assert_eq!(log.file, Some(PathBuf::from("/tmp/pxctl.log")));

        let bad = ToolConfig {
            log_level: "loud".to_string(),
            ..Default::default()
        };
        assert!(bad.log_config().is_err());
    }
}
