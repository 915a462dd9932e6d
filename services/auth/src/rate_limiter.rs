//! Login throttle for slowing down brute force attempts

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Login throttle configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Failed logins allowed inside one window
    pub max_failures: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Lockout duration in seconds
    pub lockout_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_failures: 5,
            window_seconds: 300,  // 5 minutes
            lockout_seconds: 900, // 15 minutes
        }
    }
}

impl RateLimiterConfig {
    /// Create a new RateLimiterConfig from environment variables
    ///
    /// # Environment Variables
    /// - `LOGIN_MAX_FAILURES`: Failures allowed per window (default: 5)
    /// - `LOGIN_WINDOW_SECONDS`: Window length (default: 300)
    /// - `LOGIN_LOCKOUT_SECONDS`: Lockout length (default: 900)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_failures: std::env::var("LOGIN_MAX_FAILURES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_failures),
            window_seconds: std::env::var("LOGIN_WINDOW_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.window_seconds),
            lockout_seconds: std::env::var("LOGIN_LOCKOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.lockout_seconds),
        }
    }
}

#[derive(Debug)]
struct ThrottleEntry {
    attempts: u32,
    window_start: Instant,
    locked_until: Option<Instant>,
}

impl ThrottleEntry {
    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        match self.locked_until {
            Some(until) => now >= until,
            None => now.duration_since(self.window_start) >= window,
        }
    }
}

#[derive(Debug)]
struct ThrottleState {
    entries: HashMap<String, ThrottleEntry>,
    last_sweep: Instant,
}

/// Per-key attempt counter with temporary lockout
///
/// Keys are normalized identifiers, tracked whether or not an account exists.
/// An attempt is counted when it is admitted, before the secret is checked,
/// and a successful login clears the count. A `max_failures` of zero disables
/// throttling.
#[derive(Debug, Clone)]
pub struct LoginThrottle {
    config: RateLimiterConfig,
    state: Arc<Mutex<ThrottleState>>,
}

impl LoginThrottle {
    /// Create a new login throttle
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(ThrottleState {
                entries: HashMap::new(),
                last_sweep: Instant::now(),
            })),
        }
    }

    /// Admit a login attempt for `key`, counting it against the limit
    ///
    /// Returns false while `key` is locked out.
    pub async fn try_acquire(&self, key: &str) -> bool {
        self.try_acquire_at(key, Instant::now()).await
    }

    /// Forget the attempts of `key` after a successful login
    pub async fn reset(&self, key: &str) {
        self.state.lock().await.entries.remove(key);
    }

    async fn try_acquire_at(&self, key: &str, now: Instant) -> bool {
        if self.config.max_failures == 0 {
            return true;
        }

        let window = Duration::from_secs(self.config.window_seconds);
        let mut state = self.state.lock().await;

        // Entries whose window or lockout has run out carry no information
        if now.duration_since(state.last_sweep) >= window {
            state.entries.retain(|_, entry| !entry.is_stale(now, window));
            state.last_sweep = now;
        }

        let entry = state
            .entries
            .entry(key.to_string())
            .or_insert(ThrottleEntry {
                attempts: 0,
                window_start: now,
                locked_until: None,
            });

        if let Some(until) = entry.locked_until {
            if now < until {
                return false;
            }
        }

        if entry.is_stale(now, window) {
            entry.attempts = 0;
            entry.window_start = now;
            entry.locked_until = None;
        }

        entry.attempts += 1;

        if entry.attempts >= self.config.max_failures {
            entry.locked_until = Some(now + Duration::from_secs(self.config.lockout_seconds));
            warn!(
                "Locked out {} for {} seconds after {} login attempts",
                key, self.config.lockout_seconds, entry.attempts
            );
        }

        true
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.state.lock().await.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throttle(max_failures: u32) -> LoginThrottle {
        LoginThrottle::new(RateLimiterConfig {
            max_failures,
            window_seconds: 60,
            lockout_seconds: 120,
        })
    }

    #[tokio::test]
    async fn test_locks_after_max_attempts() {
        let throttle = throttle(3);
        let start = Instant::now();

        for _ in 0..3 {
            assert!(throttle.try_acquire_at("alice", start).await);
        }

        assert!(!throttle.try_acquire_at("alice", start).await);
        assert!(throttle.try_acquire_at("bob", start).await);
    }

    #[tokio::test]
    async fn test_lockout_expires() {
        let throttle = throttle(1);
        let start = Instant::now();

        assert!(throttle.try_acquire_at("alice", start).await);
        assert!(
            !throttle
                .try_acquire_at("alice", start + Duration::from_secs(119))
                .await
        );
        assert!(
            throttle
                .try_acquire_at("alice", start + Duration::from_secs(120))
                .await
        );
    }

    #[tokio::test]
    async fn test_window_expiry_resets_attempts() {
        let throttle = throttle(2);
        let start = Instant::now();

        assert!(throttle.try_acquire_at("alice", start).await);
        let later = start + Duration::from_secs(61);
        assert!(throttle.try_acquire_at("alice", later).await);
        assert!(!throttle.try_acquire_at("alice", later).await);
    }

    #[tokio::test]
    async fn test_reset_clears_attempts() {
        let throttle = throttle(2);

        assert!(throttle.try_acquire("alice").await);
        throttle.reset("alice").await;
        assert!(throttle.try_acquire("alice").await);

        assert_eq!(throttle.tracked_keys().await, 1);
    }

    #[tokio::test]
    async fn test_zero_disables_throttle() {
        let throttle = throttle(0);

        for _ in 0..10 {
            assert!(throttle.try_acquire("alice").await);
        }

        assert_eq!(throttle.tracked_keys().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_attempts_are_capped() {
        let throttle = throttle(2);

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let throttle = throttle.clone();
                tokio::spawn(async move { throttle.try_acquire("alice").await })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }

        assert_eq!(admitted, 2);
    }

    #[tokio::test]
    async fn test_stale_entries_are_pruned() {
        let throttle = LoginThrottle::new(RateLimiterConfig {
            max_failures: 5,
            window_seconds: 1,
            lockout_seconds: 1,
        });
        let start = Instant::now();

        for i in 0..1_000 {
            throttle
                .try_acquire_at(&format!("user{}@example.com", i), start)
                .await;
        }
        assert_eq!(throttle.tracked_keys().await, 1_000);

        let later = start + Duration::from_secs(3600);
        assert!(throttle.try_acquire_at("fresh@example.com", later).await);
        assert_eq!(throttle.tracked_keys().await, 1);
    }

    #[tokio::test]
    async fn test_live_lockouts_survive_pruning() {
        let throttle = LoginThrottle::new(RateLimiterConfig {
            max_failures: 1,
            window_seconds: 1,
            lockout_seconds: 600,
        });
        let start = Instant::now();

        assert!(throttle.try_acquire_at("alice", start).await);

        let later = start + Duration::from_secs(10);
        assert!(throttle.try_acquire_at("bob", later).await);
        assert!(!throttle.try_acquire_at("alice", later).await);
    }
}
