//! Executor session: browser identity plus cookie jar.

use reqwest::header::{HeaderMap, SET_COOKIE};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

use catwatch_types::models::{SessionConfig, SessionInfo};
use catwatch_types::RequestMode;

use super::user_agent::user_agent_for_session;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user_agent: &'static str,
    pub mode: RequestMode,
    pub requests_issued: u64,
    pub created_at: Instant,
    cookies: BTreeMap<String, String>,
}

impl Session {
    pub fn new(mode: RequestMode) -> Self {
        Self::new_at(mode, Instant::now())
    }

    pub fn new_at(mode: RequestMode, now: Instant) -> Self {
        let id = Uuid::new_v4().to_string();
        let user_agent = user_agent_for_session(&id);
        Self {
            id,
            user_agent,
            mode,
            requests_issued: 0,
            created_at: now,
            cookies: BTreeMap::new(),
        }
    }

    /// Whether the session must be replaced before serving `mode`.
    pub fn needs_refresh(&self, mode: RequestMode, config: &SessionConfig, now: Instant) -> bool {
        self.mode != mode
            || self.requests_issued >= config.max_requests
            || now.saturating_duration_since(self.created_at)
                >= Duration::from_secs(config.max_age_seconds)
    }

    /// Store `name=value` pairs from every `Set-Cookie` header.
    ///
    /// Attributes (`Path`, `Expires`, ...) are dropped; an empty value removes
    /// the cookie. Returns how many cookies were updated.
    pub fn absorb_cookies(&mut self, headers: &HeaderMap) -> usize {
        let mut updated = 0;
        for value in headers.get_all(SET_COOKIE) {
            let Ok(raw) = value.to_str() else {
                continue;
            };
            let pair = raw.split(';').next().unwrap_or_default();
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let value = value.trim();
            if value.is_empty() {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), value.to_string());
            }
            updated += 1;
        }
        updated
    }

    /// `Cookie` header value, `None` when the jar is empty.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    pub fn cookie_count(&self) -> usize {
        self.cookies.len()
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id.clone(),
            mode: self.mode,
            requests_issued: self.requests_issued,
            age_seconds: self.created_at.elapsed().as_secs(),
            cookies: self.cookies.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_refresh_on_request_ceiling() {
        let config = SessionConfig { max_requests: 2, ..Default::default() };
        let now = Instant::now();
        let mut session = Session::new_at(RequestMode::Enhanced, now);

        assert!(!session.needs_refresh(RequestMode::Enhanced, &config, now));
        session.requests_issued = 2;
        assert!(session.needs_refresh(RequestMode::Enhanced, &config, now));
    }

    #[test]
    fn test_refresh_on_age_and_mode() {
        let config = SessionConfig::default();
        let now = Instant::now();
        let session = Session::new_at(RequestMode::Enhanced, now);

        assert!(session.needs_refresh(RequestMode::EnhancedProxied, &config, now));
        assert!(!session.needs_refresh(RequestMode::Enhanced, &config, now + Duration::from_secs(60)));
        assert!(session.needs_refresh(RequestMode::Enhanced, &config, now + Duration::from_secs(1800)));
    }

    #[test]
    fn test_absorb_cookies() {
        let mut session = Session::new(RequestMode::Enhanced);
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("sid=abc123; Path=/; HttpOnly"));
        headers.append(SET_COOKIE, HeaderValue::from_static("region=eu; Max-Age=3600"));
        headers.append(SET_COOKIE, HeaderValue::from_static("broken"));

        assert_eq!(session.absorb_cookies(&headers), 2);
        assert_eq!(session.cookie_header().as_deref(), Some("region=eu; sid=abc123"));

        let mut clear = HeaderMap::new();
        clear.append(SET_COOKIE, HeaderValue::from_static("sid=; Max-Age=0"));
        session.absorb_cookies(&clear);
        assert_eq!(session.cookie_header().as_deref(), Some("region=eu"));
    }

    #[test]
    fn test_new_session_has_no_cookies() {
        let session = Session::new(RequestMode::Basic);
        assert!(session.cookie_header().is_none());
        assert_eq!(session.info().requests_issued, 0);
    }
}
