//! User-Agent rotation for enhanced tiers.
//!
//! Each session picks one browser identity from the pool and keeps it for its
//! lifetime. Selection hashes the session id, so a refreshed session usually
//! lands on a different entry.

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// 64-bit FNV-1a; `DefaultHasher` output may change between releases.
fn session_hash(session_id: &str) -> u64 {
    session_id
        .bytes()
        .fold(FNV_OFFSET_BASIS, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME))
}

/// Identity sent by the basic tier.
pub const BASIC_USER_AGENT: &str = concat!("catwatch/", env!("CARGO_PKG_VERSION"));

/// Desktop and mobile browser identities.
const USER_AGENT_POOL: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.6 Safari/605.1.15",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.6 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Mobile Safari/537.36",
];

/// Browser User-Agent for a session id.
#[inline]
pub fn user_agent_for_session(session_id: &str) -> &'static str {
    let index = session_hash(session_id) % USER_AGENT_POOL.len() as u64;
    USER_AGENT_POOL[index as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_session_same_agent() {
        let id = "0b7f3c1e-5d2a-4e8f-9a61-2c4d8e7f1a90";
        assert_eq!(user_agent_for_session(id), user_agent_for_session(id));
    }

    #[test]
    fn test_agents_spread_across_pool() {
        let distinct: std::collections::HashSet<_> =
            (0..64).map(|i| user_agent_for_session(&format!("session-{}", i))).collect();
        assert!(distinct.len() > 3, "Expected rotation across the pool, got {}", distinct.len());
    }

    #[test]
    fn test_basic_agent_is_not_a_browser() {
        assert!(BASIC_USER_AGENT.starts_with("catwatch/"));
        assert!(USER_AGENT_POOL.iter().all(|ua| ua.starts_with("Mozilla/5.0")));
    }
}
