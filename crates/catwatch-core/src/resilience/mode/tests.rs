use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use catwatch_types::models::{ModeConfig, ProxyAdvisorConfig, ProxyHealthConfig};
use catwatch_types::RequestMode;

use crate::resilience::mode::{ModeController, TransitionReason};
use crate::resilience::pool::ProxyHealthManager;

fn pool(proxies: &[&str]) -> Arc<ProxyHealthManager> {
    let raw: Vec<String> = proxies.iter().map(|s| (*s).to_string()).collect();
    Arc::new(ProxyHealthManager::with_proxies(
        ProxyHealthConfig::default(),
        ProxyAdvisorConfig::default(),
        &raw,
    ))
}

fn controller(proxies: &[&str]) -> ModeController {
    ModeController::new(ModeConfig::default(), 20, pool(proxies))
}

fn fail(controller: &ModeController, times: usize) {
    let mode = controller.current_mode();
    for _ in 0..times {
        controller.record_outcome(mode, false);
    }
}

#[test]
fn test_starts_in_basic() {
    let controller = controller(&[]);
    assert_eq!(controller.current_mode(), RequestMode::Basic);
    assert!(!controller.should_switch());
}

#[test]
fn test_third_basic_failure_switches_once() {
    let controller = controller(&[]);

    for expected_switch in [false, false, true] {
        controller.record_outcome(RequestMode::Basic, false);
        assert_eq!(controller.should_switch(), expected_switch);
    }

    assert_eq!(controller.current_mode(), RequestMode::Enhanced);
    assert_eq!(controller.errors(RequestMode::Basic), 0);
    assert!(!controller.should_switch());
    assert_eq!(controller.snapshot().total_switches, 1);
}

#[test]
fn test_success_does_not_clear_switch_counter() {
    let controller = controller(&[]);
    controller.record_outcome(RequestMode::Basic, false);
    controller.record_outcome(RequestMode::Basic, false);
    controller.record_outcome(RequestMode::Basic, true);
    controller.record_outcome(RequestMode::Basic, false);

    assert_eq!(controller.errors(RequestMode::Basic), 3);
    assert_eq!(controller.tier_window(RequestMode::Basic).consecutive_errors, 1);
    assert!(controller.should_switch());
}

#[test]
fn test_dwell_timeout_advances() {
    let controller = controller(&[]);
    let later = Instant::now() + Duration::from_secs(301);

    let transition = controller.should_switch_at(later).unwrap();
    assert_eq!(transition.from, RequestMode::Basic);
    assert_eq!(transition.to, RequestMode::Enhanced);
    assert_eq!(transition.reason, TransitionReason::DwellTimeout);

    // dwell clock restarted at `later`
    assert!(controller.should_switch_at(later + Duration::from_secs(10)).is_none());
}

#[test]
fn test_proxied_errors_fall_back_to_enhanced() {
    let controller = controller(&["http://10.0.0.1:8080"]);
    controller.force_mode(RequestMode::EnhancedProxied, TransitionReason::Manual);

    fail(&controller, 3);
    let transition = controller.should_switch_at(Instant::now()).unwrap();

    assert_eq!(transition.to, RequestMode::Enhanced);
    assert_eq!(controller.current_mode(), RequestMode::Enhanced);
    assert_eq!(controller.errors(RequestMode::EnhancedProxied), 0);
}

#[test]
fn test_enhanced_errors_escalate_to_proxied() {
    let controller = controller(&["http://10.0.0.1:8080"]);
    controller.force_mode(RequestMode::Enhanced, TransitionReason::Manual);

    fail(&controller, 3);
    let transition = controller.should_switch_at(Instant::now()).unwrap();
    assert_eq!(transition.to, RequestMode::EnhancedProxied);
    assert_eq!(transition.reason, TransitionReason::ErrorThreshold);
}

#[test]
fn test_no_usable_proxy_stays_enhanced() {
    let controller = controller(&[]);
    controller.force_mode(RequestMode::Enhanced, TransitionReason::Manual);
    let switches = controller.snapshot().total_switches;

    fail(&controller, 3);
    let now = Instant::now();
    assert!(controller.should_switch_at(now).is_none());

    assert_eq!(controller.current_mode(), RequestMode::Enhanced);
    assert_eq!(controller.errors(RequestMode::Enhanced), 0);
    assert_eq!(controller.snapshot().total_switches, switches);
    // dwell clock refreshed, so no immediate re-evaluation
    assert!(controller.should_switch_at(now + Duration::from_secs(1)).is_none());
}

#[test]
fn test_advisor_blocks_escalation_on_healthy_enhanced() {
    let pool = pool(&["http://10.0.0.1:8080"]);
    let config = ModeConfig { error_threshold: 2, ..Default::default() };
    let controller = ModeController::new(config, 20, pool);
    controller.force_mode(RequestMode::Enhanced, TransitionReason::Manual);

    // interleaved failures: switch counter reaches 2, but the tier is mostly
    // healthy and never has 3 consecutive errors
    for _ in 0..8 {
        controller.record_outcome(RequestMode::Enhanced, true);
    }
    controller.record_outcome(RequestMode::Enhanced, false);
    controller.record_outcome(RequestMode::Enhanced, true);
    controller.record_outcome(RequestMode::Enhanced, false);

    assert!(controller.should_switch_at(Instant::now()).is_none());
    assert_eq!(controller.current_mode(), RequestMode::Enhanced);
    assert_eq!(controller.errors(RequestMode::Enhanced), 0);
}

#[test]
fn test_fallback_only_from_proxied() {
    let controller = controller(&["http://10.0.0.1:8080"]);
    assert!(controller.fallback_to_enhanced(TransitionReason::NoProxyAvailable).is_none());
    assert_eq!(controller.current_mode(), RequestMode::Basic);

    controller.force_mode(RequestMode::EnhancedProxied, TransitionReason::Manual);
    let transition = controller.fallback_to_enhanced(TransitionReason::NoProxyAvailable).unwrap();
    assert_eq!(transition.from, RequestMode::EnhancedProxied);
    assert_eq!(controller.current_mode(), RequestMode::Enhanced);
}

#[test]
fn test_runaway_reset_clears_all_tiers() {
    let controller = controller(&[]);
    for mode in RequestMode::ALL {
        controller.set_errors(mode, 7);
    }
    assert_eq!(controller.error_total(), 21);

    let now = Instant::now();
    assert_eq!(controller.reset_if_runaway_at(20, now), Some(21));
    assert_eq!(controller.error_total(), 0);
    assert_eq!(controller.current_mode(), RequestMode::Enhanced);

    // idempotent once cleared
    assert_eq!(controller.reset_if_runaway_at(20, now), None);
}

#[test]
fn test_runaway_not_triggered_at_ceiling() {
    let controller = controller(&[]);
    controller.force_mode(RequestMode::Enhanced, TransitionReason::Manual);
    for _ in 0..20 {
        controller.record_outcome(RequestMode::Enhanced, false);
    }
    assert_eq!(controller.reset_if_runaway_at(20, Instant::now()), None);
    assert_eq!(controller.errors(RequestMode::Enhanced), 20);
}

#[test]
fn test_stuck_escalation_requires_no_progress() {
    let controller = controller(&[]);
    let threshold = Duration::from_secs(1800);
    let later = Instant::now() + Duration::from_secs(1801);

    controller.record_outcome(RequestMode::Basic, true);
    assert!(controller.escalate_if_stuck_at(threshold, later).is_none());

    controller.force_mode(RequestMode::Enhanced, TransitionReason::Manual);
    let later = Instant::now() + Duration::from_secs(1801);
    let transition = controller.escalate_if_stuck_at(threshold, later).unwrap();
    assert_eq!(transition.from, RequestMode::Enhanced);
    assert_eq!(transition.to, RequestMode::EnhancedProxied);
    assert_eq!(transition.reason, TransitionReason::Stuck);
}

#[test]
fn test_tier_window_tracks_recent_outcomes() {
    let controller = ModeController::new(ModeConfig::default(), 4, pool(&[]));
    controller.force_mode(RequestMode::Enhanced, TransitionReason::Manual);
    for success in [false, false, true, true, true, false] {
        controller.record_outcome(RequestMode::Enhanced, success);
    }

    let window = controller.tier_window(RequestMode::Enhanced);
    assert_eq!(window.samples, 4);
    assert_eq!(window.successes, 3);
    assert_eq!(window.consecutive_errors, 1);
    assert_eq!(window.success_rate(), Some(0.75));

    let snapshot = controller.snapshot();
    let enhanced = &snapshot.modes[RequestMode::Enhanced.index()];
    assert_eq!(enhanced.requests, 6);
    assert_eq!(enhanced.successes, 3);
    assert_eq!(enhanced.errors, 3);
}

#[test]
fn test_late_failures_only_update_totals() {
    let controller = controller(&[]);
    fail(&controller, 3);
    assert!(controller.should_switch());

    // workers that started in BASIC report after the switch
    controller.record_outcome(RequestMode::Basic, false);
    controller.record_outcome(RequestMode::Basic, false);

    assert_eq!(controller.errors(RequestMode::Basic), 0);
    assert_eq!(controller.error_total(), 0);
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.modes[RequestMode::Basic.index()].requests, 5);
    assert_eq!(controller.tier_window(RequestMode::Basic).consecutive_errors, 5);
}

#[test]
fn test_late_proxied_failures_do_not_shorten_next_stay() {
    let controller = controller(&["http://10.0.0.1:8080", "http://10.0.0.2:8080"]);
    controller.force_mode(RequestMode::EnhancedProxied, TransitionReason::Manual);

    fail(&controller, 3);
    assert!(controller.should_switch());
    assert_eq!(controller.current_mode(), RequestMode::Enhanced);

    controller.record_outcome(RequestMode::EnhancedProxied, false);
    controller.record_outcome(RequestMode::EnhancedProxied, false);

    fail(&controller, 3);
    assert!(controller.should_switch());
    assert_eq!(controller.current_mode(), RequestMode::EnhancedProxied);
    assert_eq!(controller.errors(RequestMode::EnhancedProxied), 0);

    controller.record_outcome(RequestMode::EnhancedProxied, false);
    assert!(!controller.should_switch());
    assert_eq!(controller.current_mode(), RequestMode::EnhancedProxied);
}

#[test]
fn test_concurrent_failures_are_not_lost() {
    const WORKERS: usize = 8;
    const FAILURES: usize = 250;

    let config = ModeConfig { error_threshold: u32::MAX, dwell_seconds: 86_400 };
    let controller = ModeController::new(config, 20, pool(&[]));

    thread::scope(|scope| {
        for _ in 0..WORKERS {
            scope.spawn(|| {
                for _ in 0..FAILURES {
                    controller.record_outcome(RequestMode::Basic, false);
                    assert!(!controller.should_switch());
                }
            });
        }
    });

    let expected = (WORKERS * FAILURES) as u32;
    assert_eq!(controller.errors(RequestMode::Basic), expected);
    let snapshot = controller.snapshot();
    let basic = &snapshot.modes[RequestMode::Basic.index()];
    assert_eq!(basic.requests, expected as u64);
    assert_eq!(basic.successes, 0);
}

#[test]
fn test_concurrent_workers_switch_exactly_once() {
    let controller = controller(&[]);

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..50 {
                    controller.record_outcome(RequestMode::Basic, false);
                    controller.should_switch();
                }
            });
        }
    });

    assert_eq!(controller.current_mode(), RequestMode::Enhanced);
    assert_eq!(controller.snapshot().total_switches, 1);
    assert_eq!(controller.errors(RequestMode::Basic), 0);
    assert_eq!(controller.errors(RequestMode::Enhanced), 0);
    assert_eq!(controller.snapshot().modes[RequestMode::Basic.index()].requests, 400);
}
