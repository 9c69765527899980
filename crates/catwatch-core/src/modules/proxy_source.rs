//! Proxy source loading.
//!
//! Proxies come from the inline `polling.proxies` list and an optional text
//! file with one entry per line. Entries are passed to the pool as-is; the
//! pool parses, validates and dedupes them.

use std::fs;
use std::path::{Path, PathBuf};

use catwatch_types::models::PollingConfig;
use catwatch_types::ConfigError;

/// Split proxy file content into entries, skipping blanks and `#` comments.
pub fn parse_proxy_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn load_proxy_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let entries = parse_proxy_list(&content);
    tracing::info!(path = %path.display(), entries = entries.len(), "Loaded proxy file");
    Ok(entries)
}

/// Inline proxies followed by the file entries (file path override wins over config).
pub fn collect_proxies(
    polling: &PollingConfig,
    file_override: Option<&Path>,
) -> Result<Vec<String>, ConfigError> {
    let mut entries = polling.proxies.clone();

    let file = file_override
        .map(Path::to_path_buf)
        .or_else(|| polling.proxy_file.as_ref().map(PathBuf::from));
    if let Some(path) = file {
        entries.extend(load_proxy_file(&path)?);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let content = "# residential\nhttp://10.0.0.1:8080\n\n   \n10.0.0.2:3128:user:pw\n  # old\n";
        assert_eq!(
            parse_proxy_list(content),
            vec!["http://10.0.0.1:8080".to_string(), "10.0.0.2:3128:user:pw".to_string()]
        );
    }

    #[test]
    fn test_collect_inline_and_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "socks5://10.0.0.3:1080").unwrap();

        let polling = PollingConfig {
            proxies: vec!["http://10.0.0.1:8080".to_string()],
            proxy_file: Some(file.path().display().to_string()),
            ..Default::default()
        };

        let entries = collect_proxies(&polling, None).unwrap();
        assert_eq!(entries, vec!["http://10.0.0.1:8080", "socks5://10.0.0.3:1080"]);
    }

    #[test]
    fn test_override_replaces_configured_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "10.0.0.9:8000").unwrap();

        let polling = PollingConfig {
            proxy_file: Some("/nonexistent/proxies.txt".to_string()),
            ..Default::default()
        };
        let entries = collect_proxies(&polling, Some(file.path())).unwrap();
        assert_eq!(entries, vec!["10.0.0.9:8000"]);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = load_proxy_file(Path::new("/nonexistent/proxies.txt"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }
}
