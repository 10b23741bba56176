//! Per-client rate limiting for device-control endpoints
//!
//! Fixed-window counters keyed by client identifier. Each command family
//! (cast control, key presses, app launches) owns an independent limiter with
//! its own window configuration. Bursts straddling a window boundary are an
//! accepted imprecision of the fixed-window strategy, not a bug.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Rate limiting configuration for one command family
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u32,

    /// Time window for rate limiting
    pub window: Duration,

    /// Minimum interval between eviction passes over the bucket map
    pub prune_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(1),
            prune_interval: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    /// Requests-per-window constructor used by the per-family configs
    pub fn per_window(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            ..Self::default()
        }
    }
}

/// Fixed window counter for one client
#[derive(Debug, Clone)]
struct Window {
    /// Requests admitted in the current window
    count: u32,

    /// Window start time
    started: Instant,
}

impl Window {
    fn empty(now: Instant) -> Self {
        Self {
            count: 0,
            started: now,
        }
    }

    fn reset(&mut self, now: Instant) {
        self.count = 0;
        self.started = now;
    }

    fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now.duration_since(self.started) >= window
    }
}

/// Result of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is admitted
    Allowed,

    /// Request is rejected until the window resets
    Limited { reset_at: Instant },
}

impl RateLimitResult {
    /// Whether the request was admitted
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed)
    }
}

/// Fixed-window rate limiter shared across requests.
///
/// State lives in process memory only; a restart resets every counter.
/// Stale client entries are evicted once their window has been expired for a
/// full extra window, so the map stays bounded by the set of recently active
/// clients instead of growing for the process lifetime.
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: RwLock<HashMap<String, Window>>,
    last_prune: RwLock<Instant>,
}

impl RateLimiter {
    /// Create a rate limiter with the given config
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: RwLock::new(HashMap::new()),
            last_prune: RwLock::new(Instant::now()),
        }
    }

    /// Check whether a request from `client_id` is admitted.
    ///
    /// The window check and counter increment happen under one write lock
    /// with no await point in between.
    pub async fn admit(&self, client_id: &str) -> RateLimitResult {
        let now = Instant::now();
        self.maybe_prune(now).await;

        let mut buckets = self.buckets.write().await;
        let window = buckets
            .entry(client_id.to_string())
            .or_insert_with(|| Window::empty(now));

        if window.is_expired(now, self.config.window) {
            window.reset(now);
        }

        if window.count < self.config.max_requests {
            window.count += 1;
            debug!(
                client_id = client_id,
                count = window.count,
                max_requests = self.config.max_requests,
                "request admitted"
            );
            RateLimitResult::Allowed
        } else {
            let reset_at = window.started + self.config.window;
            warn!(
                client_id = client_id,
                count = window.count,
                max_requests = self.config.max_requests,
                "request rate limited"
            );
            RateLimitResult::Limited { reset_at }
        }
    }

    /// Evict entries whose window expired more than one full window ago
    pub async fn prune(&self) {
        let now = Instant::now();
        let mut buckets = self.buckets.write().await;
        let before = buckets.len();
        let grace = self.config.window * 2;
        buckets.retain(|_, window| !window.is_expired(now, grace));

        let evicted = before - buckets.len();
        if evicted > 0 {
            debug!(
                evicted = evicted,
                remaining = buckets.len(),
                "pruned stale rate limit entries"
            );
        }
    }

    /// Number of tracked clients (expired entries included until pruned)
    pub async fn tracked_clients(&self) -> usize {
        self.buckets.read().await.len()
    }

    async fn maybe_prune(&self, now: Instant) {
        {
            let last = self.last_prune.read().await;
            if now.duration_since(*last) < self.config.prune_interval {
                return;
            }
        }
        *self.last_prune.write().await = now;
        self.prune().await;
    }
}
