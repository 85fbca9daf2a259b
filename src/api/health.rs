//! Shared health state for the /health endpoint.
//! Updated by the refresher, read by the API.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Default)]
pub struct HealthState {
    /// True when the last giveaway fetch succeeded.
    pub upstream_ok: AtomicBool,
    /// Millisecond timestamp of the last successful refresh (0 = never).
    pub last_refresh_at_ms: AtomicU64,
    /// Consecutive failed refreshes since the last success.
    pub refresh_failures: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, at_ms: u64) {
        self.upstream_ok.store(true, Ordering::Relaxed);
        self.last_refresh_at_ms.store(at_ms, Ordering::Relaxed);
        self.refresh_failures.store(0, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.upstream_ok.store(false, Ordering::Relaxed);
        self.refresh_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn upstream_ok(&self) -> bool {
        self.upstream_ok.load(Ordering::Relaxed)
    }

    pub fn last_refresh_at_ms(&self) -> u64 {
        self.last_refresh_at_ms.load(Ordering::Relaxed)
    }

    pub fn refresh_failures(&self) -> u64 {
        self.refresh_failures.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_resets_failures() {
        let h = HealthState::new();
        assert!(!h.upstream_ok());
        h.record_failure();
        h.record_failure();
        assert_eq!(h.refresh_failures(), 2);
        h.record_success(1_700_000_000_000);
        assert!(h.upstream_ok());
        assert_eq!(h.refresh_failures(), 0);
        assert_eq!(h.last_refresh_at_ms(), 1_700_000_000_000);
    }
}
