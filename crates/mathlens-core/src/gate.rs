//! Per-client request gate.
//!
//! A sliding-window log of accepted request instants per key. Keys are chosen
//! by the caller (the HTTP layer uses client address plus route). The clock is
//! injected so tests can advance time deterministically.

use dashmap::DashMap;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;

/// Expired keys are swept once every this many checks.
const CLEANUP_INTERVAL: u64 = 1024;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset_ms: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_ms: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}

/// Outcome of a gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Configured requests per window
    pub limit: u32,
    /// Requests left in the current window after this one
    pub remaining: u32,
    /// Time until the oldest counted request leaves the window (zero when allowed)
    pub retry_after: Duration,
}

/// Trait that request gates implement.
pub trait RateLimiter: Send + Sync {
    /// Check and, if allowed, count a request for `key`.
    fn check(&self, key: &str) -> RateDecision;

    /// Convenience form of [`RateLimiter::check`].
    fn allow(&self, key: &str) -> bool {
        self.check(key).allowed
    }

    /// Requests allowed per window.
    fn limit(&self) -> u32;

    /// Window length.
    fn window(&self) -> Duration;

    /// Limiter name for logging.
    fn name(&self) -> &str;
}

/// In-memory sliding-window limiter.
pub struct SlidingWindowLimiter {
    limit: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    /// Accepted request instants by key, oldest first
    hits: DashMap<String, VecDeque<Instant>>,
    checks: AtomicU64,
}

impl SlidingWindowLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self::with_clock(limit, window, Arc::new(SystemClock))
    }

    pub fn with_clock(limit: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            limit,
            window,
            clock,
            hits: DashMap::new(),
            checks: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests, Duration::from_secs(config.window_secs))
    }

    /// Drop keys whose newest hit is outside the window.
    pub fn cleanup_expired(&self) {
        let now = self.clock.now();
        let window = self.window;
        self.hits.retain(|_, log| {
            log.back()
                .is_some_and(|&last| now.saturating_duration_since(last) < window)
        });
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.hits.len()
    }
}

impl RateLimiter for SlidingWindowLimiter {
    fn check(&self, key: &str) -> RateDecision {
        let now = self.clock.now();

        let decision = {
            let mut entry = self.hits.entry(key.to_string()).or_default();
            let log = entry.value_mut();

            while log
                .front()
                .is_some_and(|&oldest| now.saturating_duration_since(oldest) >= self.window)
            {
                log.pop_front();
            }

            if (log.len() as u32) < self.limit {
                log.push_back(now);
                RateDecision {
                    allowed: true,
                    limit: self.limit,
                    remaining: self.limit - log.len() as u32,
                    retry_after: Duration::ZERO,
                }
            } else {
                let retry_after = log
                    .front()
                    .map(|&oldest| self.window.saturating_sub(now.saturating_duration_since(oldest)))
                    .unwrap_or(self.window);
                RateDecision {
                    allowed: false,
                    limit: self.limit,
                    remaining: 0,
                    retry_after,
                }
            }
        };

        // Entry guard is released above; sweeping takes shard locks
        if self.checks.fetch_add(1, Ordering::Relaxed) % CLEANUP_INTERVAL == CLEANUP_INTERVAL - 1 {
            self.cleanup_expired();
        }

        decision
    }

    fn limit(&self) -> u32 {
        self.limit
    }

    fn window(&self) -> Duration {
        self.window
    }

    fn name(&self) -> &str {
        "SlidingWindowLimiter"
    }
}

impl fmt::Debug for SlidingWindowLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlidingWindowLimiter")
            .field("limit", &self.limit)
            .field("window", &self.window)
            .field("tracked_keys", &self.hits.len())
            .finish()
    }
}
