//! Advisory checks for entering and leaving the proxied tier.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

use catwatch_types::models::ProxyAdvisorConfig;

use crate::resilience::mode::TierWindow;

#[derive(Debug, Default)]
struct DirectAttempts {
    attempts: u32,
    last_attempt: Option<Instant>,
}

/// Decides whether proxies are worth paying for.
#[derive(Debug)]
pub struct ProxyAdvisor {
    config: ProxyAdvisorConfig,
    direct: Mutex<DirectAttempts>,
}

impl ProxyAdvisor {
    pub fn new(config: ProxyAdvisorConfig) -> Self {
        Self { config, direct: Mutex::new(DirectAttempts::default()) }
    }

    pub fn config(&self) -> &ProxyAdvisorConfig {
        &self.config
    }

    /// Whether the enhanced tier is degraded enough to justify a proxy.
    pub fn should_use_proxy(&self, enhanced: &TierWindow) -> bool {
        if enhanced.consecutive_errors >= self.config.use_proxy_consecutive_errors {
            return true;
        }
        enhanced.samples >= self.config.min_samples
            && enhanced
                .success_rate()
                .is_some_and(|rate| rate < self.config.use_proxy_min_success_rate)
    }

    /// Whether a sustained-success window on the proxied tier justifies a
    /// direct probe. Consumes one attempt when it returns true.
    pub fn should_try_without_proxy(&self, proxied: &TierWindow) -> bool {
        self.should_try_without_proxy_at(proxied, Instant::now())
    }

    pub fn should_try_without_proxy_at(&self, proxied: &TierWindow, now: Instant) -> bool {
        if proxied.samples < self.config.direct_min_samples || proxied.consecutive_errors > 0 {
            return false;
        }
        let healthy = proxied
            .success_rate()
            .is_some_and(|rate| rate >= self.config.direct_min_success_rate);
        if !healthy {
            return false;
        }

        let mut direct = self.direct.lock();
        if direct.attempts >= self.config.max_direct_attempts {
            return false;
        }
        let cooldown = Duration::from_secs(self.config.direct_probe_cooldown_seconds);
        if direct.last_attempt.is_some_and(|last| now.saturating_duration_since(last) < cooldown) {
            return false;
        }

        direct.attempts += 1;
        direct.last_attempt = Some(now);
        true
    }

    pub fn reset_direct_attempts(&self) {
        let mut direct = self.direct.lock();
        direct.attempts = 0;
        direct.last_attempt = None;
    }

    pub fn direct_attempts(&self) -> u32 {
        self.direct.lock().attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catwatch_types::RequestMode;

    fn window(samples: usize, successes: usize, consecutive_errors: u32) -> TierWindow {
        TierWindow { mode: RequestMode::Enhanced, samples, successes, consecutive_errors }
    }

    fn advisor() -> ProxyAdvisor {
        ProxyAdvisor::new(ProxyAdvisorConfig {
            direct_min_samples: 10,
            direct_probe_cooldown_seconds: 60,
            max_direct_attempts: 2,
            ..Default::default()
        })
    }

    #[test]
    fn test_use_proxy_on_consecutive_errors() {
        let advisor = advisor();
        assert!(advisor.should_use_proxy(&window(3, 0, 3)));
        assert!(!advisor.should_use_proxy(&window(3, 2, 1)));
    }

    #[test]
    fn test_use_proxy_on_low_success_rate_needs_samples() {
        let advisor = advisor();
        // 1/4 success but below min_samples (5)
        assert!(!advisor.should_use_proxy(&window(4, 1, 0)));
        // 2/10 success with enough samples
        assert!(advisor.should_use_proxy(&window(10, 2, 0)));
        assert!(!advisor.should_use_proxy(&window(10, 9, 0)));
    }

    #[test]
    fn test_direct_probe_requires_sustained_success() {
        let advisor = advisor();
        let now = Instant::now();
        assert!(!advisor.should_try_without_proxy_at(&window(5, 5, 0), now));
        assert!(!advisor.should_try_without_proxy_at(&window(10, 7, 0), now));
        assert!(!advisor.should_try_without_proxy_at(&window(10, 10, 1), now));
        assert_eq!(advisor.direct_attempts(), 0);
        assert!(advisor.should_try_without_proxy_at(&window(10, 10, 0), now));
        assert_eq!(advisor.direct_attempts(), 1);
    }

    #[test]
    fn test_direct_probe_cooldown_and_attempt_cap() {
        let advisor = advisor();
        let healthy = window(20, 20, 0);
        let t0 = Instant::now();

        assert!(advisor.should_try_without_proxy_at(&healthy, t0));
        assert!(!advisor.should_try_without_proxy_at(&healthy, t0 + Duration::from_secs(30)));
        assert!(advisor.should_try_without_proxy_at(&healthy, t0 + Duration::from_secs(61)));
        // cap of 2 reached
        assert!(!advisor.should_try_without_proxy_at(&healthy, t0 + Duration::from_secs(200)));

        advisor.reset_direct_attempts();
        assert!(advisor.should_try_without_proxy_at(&healthy, t0 + Duration::from_secs(201)));
    }
}
