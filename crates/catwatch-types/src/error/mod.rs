//! Typed error definitions for catwatch.
//!
//! All errors are designed to be:
//!
//! - **Serializable** for the stats API via serde
//! - **Displayable** for logging via Display trait
//! - **Matchable** for error handling logic via enum variants

mod channel;
mod config;
mod fetch;
mod proxy;

pub use channel::ChannelError;
pub use config::ConfigError;
pub use fetch::FetchError;
pub use proxy::ProxyError;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = ProxyError::NoProxyAvailable { reason: "empty".to_string() };

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("NoProxyAvailable"));
        assert!(json.contains("empty"));

        let deserialized: ProxyError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, deserialized);
    }

    #[test]
    fn test_error_display() {
        let err = FetchError::RateLimited { retry_after_secs: Some(60) };

        let msg = format!("{}", err);
        assert!(msg.contains("429"));
        assert!(msg.contains("60"));
    }

    #[test]
    fn test_write_error_display() {
        let err = ConfigError::WriteError {
            path: "/etc/catwatch.json".to_string(),
            message: "read-only file system".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to write /etc/catwatch.json: read-only file system");
    }
}
