//! Per-tier request headers.

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};

use catwatch_types::models::ExecutorConfig;
use catwatch_types::RequestMode;

use super::session::Session;
use super::user_agent::BASIC_USER_AGENT;

const BROWSER_ACCEPT: &str = "application/json, text/plain, */*";

/// Build headers for `mode`.
///
/// Basic sends a plain JSON client identity. Enhanced tiers look like a
/// browser tab: session User-Agent, accept and language, fetch-metadata,
/// optional referer/origin and the session cookies. Accept-Encoding is set
/// by reqwest.
pub fn build_headers(mode: RequestMode, session: &Session, config: &ExecutorConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if !mode.is_enhanced() {
        headers.insert(header::USER_AGENT, HeaderValue::from_static(BASIC_USER_AGENT));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        return headers;
    }

    headers.insert(header::USER_AGENT, HeaderValue::from_static(session.user_agent));
    headers.insert(header::ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    insert_str(&mut headers, header::ACCEPT_LANGUAGE, &config.accept_language);
    headers.insert(HeaderName::from_static("sec-fetch-dest"), HeaderValue::from_static("empty"));
    headers.insert(HeaderName::from_static("sec-fetch-mode"), HeaderValue::from_static("cors"));
    headers.insert(HeaderName::from_static("sec-fetch-site"), HeaderValue::from_static("same-origin"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    if let Some(referer) = &config.referer {
        insert_str(&mut headers, header::REFERER, referer);
    }
    if let Some(origin) = &config.origin {
        insert_str(&mut headers, header::ORIGIN, origin);
    }
    if let Some(cookies) = session.cookie_header() {
        insert_str(&mut headers, header::COOKIE, &cookies);
    }

    headers
}

fn insert_str(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            headers.insert(name, v);
        },
        Err(e) => tracing::warn!(header = %name, error = %e, "Dropping invalid header value"),
    }
}
