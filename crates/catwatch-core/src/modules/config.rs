//! Configuration loading and persistence.
//!
//! `AppConfig` lives in one JSON file. A handful of `CATWATCH_*` environment
//! variables override deployment-specific fields before validation.

use std::fs;
use std::path::Path;
use validator::Validate;

use catwatch_types::{AppConfig, ConfigError};

pub const ENV_PROXY_FILE: &str = "CATWATCH_PROXY_FILE";
pub const ENV_STATS_BIND: &str = "CATWATCH_STATS_BIND";
pub const ENV_POLL_INTERVAL: &str = "CATWATCH_POLL_INTERVAL";

/// Load configuration from a JSON file.
///
/// A missing file yields defaults. `CATWATCH_*` environment overrides are
/// applied before validation.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let mut config = if path.exists() {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str::<AppConfig>(&content)
            .map_err(|e| ConfigError::ParseError { message: e.to_string() })?
    } else {
        tracing::info!(path = %path.display(), "Config file not found, using defaults");
        AppConfig::new()
    };

    apply_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config)?;
    Ok(config)
}

/// Write configuration as pretty JSON (temp file + rename).
pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let write_error =
        |e: std::io::Error| ConfigError::WriteError { path: path.display().to_string(), message: e.to_string() };

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| ConfigError::ParseError { message: e.to_string() })?;
    let temp_path = path.with_extension("json.tmp");

    fs::write(&temp_path, content).map_err(write_error)?;
    fs::rename(&temp_path, path).map_err(write_error)
}

/// Apply environment overrides. `lookup` resolves a variable name.
pub fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(file) = lookup(ENV_PROXY_FILE).filter(|v| !v.trim().is_empty()) {
        config.polling.proxy_file = Some(file);
    }
    if let Some(bind) = lookup(ENV_STATS_BIND).filter(|v| !v.trim().is_empty()) {
        config.polling.stats_bind = bind;
    }
    if let Some(raw) = lookup(ENV_POLL_INTERVAL) {
        config.polling.interval_seconds = raw.trim().parse::<u64>().map_err(|_| {
            ConfigError::InvalidEnv { var: ENV_POLL_INTERVAL.to_string(), value: raw.clone() }
        })?;
    }
    Ok(())
}

/// Run the `validator` range checks.
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    config.validate().map_err(|errors| {
        let field = errors
            .errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "config".to_string());
        ConfigError::ValidationError { field, message: errors.to_string() }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.modes.error_threshold, 3);
        assert_eq!(config.recovery.critical_error_total, 20);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catwatch.json");
        fs::write(
            &path,
            r#"{
                "modes": { "error_threshold": 5 },
                "polling": {
                    "topics": [{ "name": "tabby", "url": "https://catalog.example/api/items",
                                 "params": { "q": "tabby" } }]
                }
            }"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.modes.error_threshold, 5);
        assert_eq!(config.modes.dwell_seconds, 300);
        assert_eq!(config.polling.topics[0].params["q"], "tabby");
        assert_eq!(config.proxy_health.baseline_score, 50);
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_validation_error() {
        let mut config = AppConfig::default();
        config.modes.error_threshold = 0;
        match validate_config(&config) {
            Err(ConfigError::ValidationError { field, .. }) => assert_eq!(field, "modes"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        apply_overrides(
            &mut config,
            lookup(&[
                (ENV_PROXY_FILE, "/etc/catwatch/proxies.txt"),
                (ENV_STATS_BIND, "0.0.0.0:9000"),
                (ENV_POLL_INTERVAL, "15"),
            ]),
        )
        .unwrap();

        assert_eq!(config.polling.proxy_file.as_deref(), Some("/etc/catwatch/proxies.txt"));
        assert_eq!(config.polling.stats_bind, "0.0.0.0:9000");
        assert_eq!(config.polling.interval_seconds, 15);
    }

    #[test]
    fn test_invalid_env_override() {
        let mut config = AppConfig::default();
        let result = apply_overrides(&mut config, lookup(&[(ENV_POLL_INTERVAL, "soon")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnv { .. })));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catwatch.json");
        let mut config = AppConfig::default();
        config.session.max_requests = 10;

        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path).unwrap().session.max_requests, 10);
    }

    #[test]
    fn test_save_into_missing_dir_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("catwatch.json");

        let result = save_config(&path, &AppConfig::default());
        assert!(matches!(result, Err(ConfigError::WriteError { .. })));
    }
}
