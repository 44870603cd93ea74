//! Credential pool with per-key rate limiting and rotation.
//!
//! A fixed, process-wide list of extraction-service API keys is shared
//! across concurrent requests. Each key is subject to three independent
//! quotas: requests per minute, requests per day, and tokens per
//! minute. All usage state lives behind one mutex; a quota check and
//! the usage recording for a granted key happen in the same critical
//! section, so two callers can never both be granted the last slot.

pub mod clock;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use tracing::{debug, error, info, warn};

use crate::security::ApiKey;
pub use clock::{Clock, SystemClock};

/// Environment variable holding the primary key.
pub const PRIMARY_KEY_VAR: &str = "GEMINI_API_KEY";

/// Numbered alternates: `GEMINI_API_KEY_1` through `GEMINI_API_KEY_19`.
pub const MAX_NUMBERED_KEYS: usize = 19;

/// Sliding-window width for per-minute quotas.
fn window() -> chrono::Duration {
    chrono::Duration::seconds(60)
}

/// Per-key quota ceilings.
#[derive(Debug, Clone, Copy)]
pub struct RateLimits {
    pub requests_per_minute: u32,
    pub requests_per_day: u32,
    pub tokens_per_minute: u64,
}

impl Default for RateLimits {
    fn default() -> Self {
        // Gemini free-tier limits.
        Self {
            requests_per_minute: 15,
            requests_per_day: 1500,
            tokens_per_minute: 1_000_000,
        }
    }
}

/// Rate-limit bookkeeping for one key.
///
/// Created lazily the first time a key is scanned, and only ever
/// touched under the pool lock.
#[derive(Debug)]
struct KeyUsage {
    /// Request timestamps inside the sliding one-minute window.
    request_times: Vec<DateTime<Utc>>,
    /// (timestamp, estimated tokens) inside the sliding window.
    token_events: Vec<(DateTime<Utc>, u64)>,
    /// Requests made on `last_reset`'s calendar day.
    requests_today: u32,
    last_reset: NaiveDate,
    /// Set when the daily cap is first observed; cleared on rollover.
    exhausted: bool,
}

impl KeyUsage {
    fn new(today: NaiveDate) -> Self {
        Self {
            request_times: Vec::new(),
            token_events: Vec::new(),
            requests_today: 0,
            last_reset: today,
            exhausted: false,
        }
    }

    /// Drop window entries older than 60 seconds and roll the daily
    /// counter exactly once when the calendar date has advanced.
    fn refresh(&mut self, now: DateTime<Utc>, suffix: &str) {
        self.request_times.retain(|&t| now - t < window());
        self.token_events.retain(|&(t, _)| now - t < window());

        let today = now.date_naive();
        if self.last_reset != today {
            self.requests_today = 0;
            self.last_reset = today;
            self.exhausted = false;
            info!(key = suffix, "reset daily counter");
        }
    }

    fn window_tokens(&self) -> u64 {
        self.token_events.iter().map(|&(_, tokens)| tokens).sum()
    }
}

/// Approximate token count for a prompt.
///
/// Word count times 1.3, truncated. A heuristic, not a tokenizer.
pub fn estimate_tokens(text: &str) -> u64 {
    let words = text.split_whitespace().count();
    (words as f64 * 1.3) as u64
}

/// Shared pool of extraction-service credentials.
pub struct KeyPool {
    keys: Vec<ApiKey>,
    limits: RateLimits,
    usage: Mutex<IndexMap<usize, KeyUsage>>,
    clock: Arc<dyn Clock>,
}

impl KeyPool {
    /// Build a pool from raw key material, in priority order.
    pub fn new(secrets: Vec<String>) -> Self {
        let keys = secrets
            .into_iter()
            .enumerate()
            .map(|(id, secret)| ApiKey::new(id, secret))
            .collect::<Vec<_>>();
        info!(keys = keys.len(), "initialized key pool");
        Self {
            keys,
            limits: RateLimits::default(),
            usage: Mutex::new(IndexMap::new()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Load keys from the environment: numbered alternates first
    /// (`GEMINI_API_KEY_1..19`), then the primary `GEMINI_API_KEY` if
    /// it is not already present. An empty pool is valid and means
    /// "text-only mode".
    pub fn from_env() -> Self {
        let mut secrets = Vec::new();
        for i in 1..=MAX_NUMBERED_KEYS {
            let name = format!("{PRIMARY_KEY_VAR}_{i}");
            if let Ok(value) = std::env::var(&name) {
                if !value.is_empty() {
                    debug!(var = %name, "loaded numbered key");
                    secrets.push(value);
                }
            }
        }
        if let Ok(value) = std::env::var(PRIMARY_KEY_VAR) {
            if !value.is_empty() && !secrets.contains(&value) {
                debug!(var = PRIMARY_KEY_VAR, "loaded primary key");
                secrets.push(value);
            }
        }
        Self::new(secrets)
    }

    /// Override quota ceilings (mainly for tests).
    pub fn with_limits(mut self, limits: RateLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Substitute the time source (mainly for tests).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Grant a key with headroom for `estimated_tokens`, or `None` if
    /// every key is at capacity right now. Non-blocking.
    ///
    /// The scan visits keys in load order; the first key passing every
    /// quota check has its usage recorded before the lock is released.
    pub fn try_acquire(&self, estimated_tokens: u64) -> Option<ApiKey> {
        let now = self.clock.now();
        let today = now.date_naive();
        let mut usage = self.usage.lock().unwrap();

        for key in &self.keys {
            let suffix = key.suffix();
            let entry = usage
                .entry(key.id())
                .or_insert_with(|| KeyUsage::new(today));
            entry.refresh(now, &suffix);

            if entry.exhausted {
                continue;
            }
            let current_rpm = entry.request_times.len() as u32;
            if current_rpm >= self.limits.requests_per_minute {
                debug!(key = %suffix, rpm = current_rpm, "key at request-per-minute limit");
                continue;
            }
            if entry.requests_today >= self.limits.requests_per_day {
                entry.exhausted = true;
                warn!(key = %suffix, today = entry.requests_today, "key exhausted for the day");
                continue;
            }
            if entry.window_tokens() + estimated_tokens > self.limits.tokens_per_minute {
                debug!(key = %suffix, "key would exceed token-per-minute limit");
                continue;
            }

            entry.request_times.push(now);
            entry.requests_today += 1;
            entry.token_events.push((now, estimated_tokens));
            debug!(
                key = %suffix,
                rpm = current_rpm + 1,
                today = entry.requests_today,
                "granted key"
            );
            return Some(key.clone());
        }

        None
    }

    /// Wait for a key with exponential backoff, bounded by `max_wait`.
    ///
    /// Polls [`try_acquire`](Self::try_acquire) starting at one second
    /// between attempts, doubling up to ten seconds. Returns `None`
    /// once the wait bound elapses — never hangs.
    pub async fn acquire(&self, estimated_tokens: u64, max_wait: Duration) -> Option<ApiKey> {
        let start = tokio::time::Instant::now();
        let mut backoff = Duration::from_secs(1);

        loop {
            if let Some(key) = self.try_acquire(estimated_tokens) {
                return Some(key);
            }
            if start.elapsed() >= max_wait {
                error!("no API key available after waiting");
                return None;
            }
            info!(backoff_secs = backoff.as_secs(), "all keys at capacity, backing off");
            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(Duration::from_secs(10));
        }
    }
}

impl std::fmt::Debug for KeyPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPool")
            .field("keys", &self.keys.len())
            .field("limits", &self.limits)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualClock;

    fn pool_with_clock(keys: usize, clock: Arc<ManualClock>) -> KeyPool {
        let secrets = (0..keys).map(|i| format!("test-key-{i:04}")).collect();
        KeyPool::new(secrets).with_clock(clock)
    }

    #[test]
    fn estimate_is_words_times_1_3_truncated() {
        assert_eq!(estimate_tokens("one two three"), 3); // 3.9 -> 3
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("a b c d e f g h i j"), 13);
    }

    #[test]
    fn request_window_enforced_and_slides() {
        let clock = Arc::new(ManualClock::new());
        let pool = pool_with_clock(1, clock.clone());

        for _ in 0..15 {
            assert!(pool.try_acquire(100).is_some());
        }
        // 16th call within the same minute is denied.
        assert!(pool.try_acquire(100).is_none());

        // After the window slides past the first 15 requests, the key
        // is available again.
        clock.advance(Duration::from_secs(61));
        assert!(pool.try_acquire(100).is_some());
    }

    #[test]
    fn token_window_enforced() {
        let clock = Arc::new(ManualClock::new());
        let pool = pool_with_clock(1, clock.clone());

        assert!(pool.try_acquire(900_000).is_some());
        // 900k + 200k would exceed the 1M token window.
        assert!(pool.try_acquire(200_000).is_none());
        // A smaller request still fits.
        assert!(pool.try_acquire(50_000).is_some());

        clock.advance(Duration::from_secs(61));
        assert!(pool.try_acquire(900_000).is_some());
    }

    #[test]
    fn daily_cap_exhausts_until_date_rollover() {
        let clock = Arc::new(ManualClock::new());
        let pool = pool_with_clock(1, clock.clone()).with_limits(RateLimits {
            requests_per_minute: u32::MAX,
            requests_per_day: 1500,
            tokens_per_minute: u64::MAX,
        });

        for _ in 0..1500 {
            assert!(pool.try_acquire(1).is_some());
        }
        // Cap reached: denied even with a fresh per-minute window.
        clock.advance(Duration::from_secs(120));
        assert!(pool.try_acquire(1).is_none());
        // Still exhausted later the same day.
        clock.advance(Duration::from_secs(3600));
        assert!(pool.try_acquire(1).is_none());

        // Date rollover clears the counter and the exhausted flag.
        clock.advance(Duration::from_secs(24 * 3600));
        assert!(pool.try_acquire(1).is_some());
    }

    #[test]
    fn rotation_falls_through_to_next_key() {
        let clock = Arc::new(ManualClock::new());
        let pool = pool_with_clock(2, clock.clone());

        let mut granted = Vec::new();
        for _ in 0..30 {
            granted.push(pool.try_acquire(10).expect("two keys give 30 slots").id());
        }
        assert!(pool.try_acquire(10).is_none());

        // First key fills first, then rotation moves on.
        assert!(granted[..15].iter().all(|&id| id == 0));
        assert!(granted[15..].iter().all(|&id| id == 1));
    }

    #[test]
    fn empty_pool_grants_nothing() {
        let pool = KeyPool::new(Vec::new());
        assert!(pool.is_empty());
        assert!(pool.try_acquire(1).is_none());
    }

    #[test]
    fn concurrent_acquires_never_exceed_the_window() {
        let clock = Arc::new(ManualClock::new());
        let pool = Arc::new(pool_with_clock(1, clock));

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let pool = pool.clone();
                std::thread::spawn(move || pool.try_acquire(10).is_some())
            })
            .collect();

        let granted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&granted| granted)
            .count();
        assert_eq!(granted, 15);
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_times_out_with_definite_answer() {
        let clock = Arc::new(ManualClock::new());
        let pool = pool_with_clock(1, clock);

        for _ in 0..15 {
            assert!(pool.try_acquire(1).is_some());
        }
        // The manual clock never advances, so the window never slides;
        // the bounded wait must still return.
        let key = pool.acquire(1, Duration::from_secs(5)).await;
        assert!(key.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_returns_once_window_slides() {
        let clock = Arc::new(ManualClock::new());
        let pool = pool_with_clock(1, clock.clone());

        for _ in 0..15 {
            assert!(pool.try_acquire(1).is_some());
        }
        clock.advance(Duration::from_secs(61));
        let key = pool.acquire(1, Duration::from_secs(65)).await;
        assert!(key.is_some());
    }
}
