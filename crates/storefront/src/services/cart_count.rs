//! Cart badge count.
//!
//! Every signed-in user gets a [`CartCounter`] in the [`CartCountRegistry`].
//! The counter is filled from the backend the first time it is needed and
//! again on every auth change; add/remove in between adjust it locally
//! without reconciling. A counter that has never loaded (new, or recreated
//! after idle eviction) fetches instead of adjusting, since local deltas on
//! an unknown base would be wrong.
//!
//! When a refresh fails the [`FailurePolicy`] decides what the badge shows:
//! the last good count flagged as stale, or zero.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use respawn_api::{AccessToken, ApiError, BackendClient};
use respawn_core::UserId;
use serde::Serialize;
use tracing::{debug, warn};

/// How long an untouched counter is kept.
const COUNTER_IDLE_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Where the count comes from.
pub trait CartSource: Send + Sync {
    /// Number of lines in the user's cart.
    fn cart_line_count(
        &self,
        token: &AccessToken,
    ) -> impl Future<Output = Result<usize, ApiError>> + Send;
}

impl CartSource for BackendClient {
    async fn cart_line_count(&self, token: &AccessToken) -> Result<usize, ApiError> {
        Ok(self.cart(token).await?.line_count())
    }
}

/// What the badge shows after a failed refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Keep the last good count and mark it stale.
    #[default]
    RetainStale,
    /// Show zero.
    ResetToZero,
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retain" | "retain-stale" => Ok(Self::RetainStale),
            "reset" | "reset-to-zero" => Ok(Self::ResetToZero),
            other => Err(format!("expected retain or reset, got {other}")),
        }
    }
}

/// Point-in-time view of a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartCount {
    pub count: usize,
    pub stale: bool,
}

#[derive(Debug, Default)]
struct CounterState {
    count: usize,
    stale: bool,
    /// Set by the first successful refresh or an explicit reset.
    loaded: bool,
    last_refreshed: Option<DateTime<Utc>>,
}

/// One user's cart badge.
#[derive(Debug)]
pub struct CartCounter {
    policy: FailurePolicy,
    state: Mutex<CounterState>,
}

impl CartCounter {
    /// A zeroed counter.
    #[must_use]
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(CounterState::default()),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut CounterState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Current count.
    #[must_use]
    pub fn count(&self) -> usize {
        self.with_state(|s| s.count)
    }

    /// Whether the count is a leftover from before a failed refresh.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.with_state(|s| s.stale)
    }

    /// Whether the count has ever been established.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.with_state(|s| s.loaded)
    }

    /// When the last successful refresh happened.
    #[must_use]
    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.with_state(|s| s.last_refreshed)
    }

    /// Count and staleness together.
    #[must_use]
    pub fn snapshot(&self) -> CartCount {
        self.with_state(|s| CartCount {
            count: s.count,
            stale: s.stale,
        })
    }

    /// Optimistically add `n` after a successful add-to-cart.
    pub fn increment(&self, n: usize) {
        self.with_state(|s| s.count = s.count.saturating_add(n));
    }

    /// Optimistically remove `n`, never going below zero.
    pub fn decrement(&self, n: usize) {
        self.with_state(|s| s.count = s.count.saturating_sub(n));
    }

    /// Set to zero, e.g. after the cart was cleared by checkout.
    pub fn reset(&self) {
        self.with_state(|s| {
            s.count = 0;
            s.stale = false;
            s.loaded = true;
        });
    }

    /// Re-read the count from `source`.
    ///
    /// Without a token the user is signed out and the count is zero. On
    /// failure the counter follows its [`FailurePolicy`]; the error is logged,
    /// not returned.
    pub async fn refresh<S: CartSource>(
        &self,
        source: &S,
        token: Option<&AccessToken>,
    ) -> CartCount {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            self.reset();
            return self.snapshot();
        };

        // No lock across the await
        let result = source.cart_line_count(token).await;

        self.with_state(|s| match result {
            Ok(count) => {
                s.count = count;
                s.stale = false;
                s.loaded = true;
                s.last_refreshed = Some(Utc::now());
                debug!(count, "Cart count refreshed");
            }
            Err(e) => {
                warn!(error = %e, policy = ?self.policy, "Cart count refresh failed");
                match self.policy {
                    FailurePolicy::RetainStale => s.stale = true,
                    FailurePolicy::ResetToZero => {
                        s.count = 0;
                        s.stale = false;
                    }
                }
            }
        });

        self.snapshot()
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Counters for all signed-in users, evicted after two idle hours.
#[derive(Clone)]
pub struct CartCountRegistry {
    policy: FailurePolicy,
    counters: Cache<UserId, Arc<CartCounter>>,
}

impl CartCountRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            counters: Cache::builder()
                .max_capacity(100_000)
                .time_to_idle(COUNTER_IDLE_TTL)
                .build(),
        }
    }

    /// The configured failure policy.
    #[must_use]
    pub const fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// The badge for a request. Signed-out visitors always see zero; a
    /// signed-in user's counter is created and refreshed on first use.
    pub async fn current<S: CartSource>(
        &self,
        source: &S,
        user: Option<(UserId, &AccessToken)>,
    ) -> CartCount {
        let Some((user_id, token)) = user else {
            return CartCount::default();
        };

        let counter = self.counter(user_id).await;
        if counter.is_loaded() {
            counter.snapshot()
        } else {
            counter.refresh(source, Some(token)).await
        }
    }

    /// Login, logout or OTP verification happened for `user_id`.
    ///
    /// With a token the counter is refreshed; without one (logout) it is
    /// zeroed and dropped.
    pub async fn auth_changed<S: CartSource>(
        &self,
        source: &S,
        user_id: UserId,
        token: Option<&AccessToken>,
    ) -> CartCount {
        match token {
            Some(token) => {
                let counter = self.counter(user_id).await;
                counter.refresh(source, Some(token)).await
            }
            None => {
                if let Some(counter) = self.counters.remove(&user_id).await {
                    counter.reset();
                }
                CartCount::default()
            }
        }
    }

    /// The counter for `user_id`, created zeroed and unloaded if missing.
    pub async fn counter(&self, user_id: UserId) -> Arc<CartCounter> {
        let policy = self.policy;
        self.counters
            .get_with(user_id, async move { Arc::new(CartCounter::new(policy)) })
            .await
    }

    /// Adjust after a successful add. An unloaded counter is fetched
    /// instead, and the fetched count already includes the add.
    pub async fn increment<S: CartSource>(
        &self,
        source: &S,
        user_id: UserId,
        token: &AccessToken,
        n: usize,
    ) -> CartCount {
        let counter = self.counter(user_id).await;
        if !counter.is_loaded() {
            return counter.refresh(source, Some(token)).await;
        }
        counter.increment(n);
        counter.snapshot()
    }

    /// Adjust after a successful remove, with the same unloaded rule as
    /// [`Self::increment`].
    pub async fn decrement<S: CartSource>(
        &self,
        source: &S,
        user_id: UserId,
        token: &AccessToken,
        n: usize,
    ) -> CartCount {
        let counter = self.counter(user_id).await;
        if !counter.is_loaded() {
            return counter.refresh(source, Some(token)).await;
        }
        counter.decrement(n);
        counter.snapshot()
    }

    /// Zero after the cart was cleared.
    pub async fn reset(&self, user_id: UserId) {
        self.counter(user_id).await.reset();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;

    /// Returns `count` until `fail` is set.
    #[derive(Default)]
    struct FakeCart {
        count: AtomicUsize,
        fail: AtomicBool,
        calls: AtomicUsize,
    }

    impl FakeCart {
        fn with_count(count: usize) -> Self {
            let fake = Self::default();
            fake.count.store(count, Ordering::SeqCst);
            fake
        }
    }

    impl CartSource for FakeCart {
        async fn cart_line_count(&self, _token: &AccessToken) -> Result<usize, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(ApiError::Status {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(self.count.load(Ordering::SeqCst))
        }
    }

    fn token() -> AccessToken {
        AccessToken::new("token")
    }

    #[tokio::test]
    async fn test_refresh_without_token_is_zero() {
        let source = FakeCart::with_count(3);
        let counter = CartCounter::new(FailurePolicy::RetainStale);
        counter.increment(5);

        let snapshot = counter.refresh(&source, None).await;
        assert_eq!(snapshot, CartCount { count: 0, stale: false });
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_refresh_counts_lines() {
        let source = FakeCart::with_count(3);
        let counter = CartCounter::new(FailurePolicy::RetainStale);

        assert_eq!(counter.refresh(&source, Some(&token())).await.count, 3);
        assert!(counter.last_refreshed().is_some());
    }

    #[tokio::test]
    async fn test_failure_retains_stale_count() {
        let source = FakeCart::with_count(4);
        let counter = CartCounter::new(FailurePolicy::RetainStale);
        counter.refresh(&source, Some(&token())).await;

        source.fail.store(true, Ordering::SeqCst);
        let snapshot = counter.refresh(&source, Some(&token())).await;

        assert_eq!(snapshot.count, 4);
        assert!(counter.is_stale());

        // A later success clears the flag
        source.fail.store(false, Ordering::SeqCst);
        source.count.store(2, Ordering::SeqCst);
        assert_eq!(
            counter.refresh(&source, Some(&token())).await,
            CartCount { count: 2, stale: false }
        );
    }

    #[tokio::test]
    async fn test_failure_resets_to_zero() {
        let source = FakeCart::with_count(4);
        let counter = CartCounter::new(FailurePolicy::ResetToZero);
        counter.refresh(&source, Some(&token())).await;

        source.fail.store(true, Ordering::SeqCst);
        let snapshot = counter.refresh(&source, Some(&token())).await;

        assert_eq!(snapshot, CartCount { count: 0, stale: false });
    }

    #[test]
    fn test_decrement_saturates() {
        let counter = CartCounter::new(FailurePolicy::RetainStale);
        counter.increment(1);
        counter.decrement(3);
        assert_eq!(counter.count(), 0);
    }

    #[tokio::test]
    async fn test_registry_fetches_once_then_adjusts_locally() {
        let source = FakeCart::with_count(2);
        let registry = CartCountRegistry::new(FailurePolicy::RetainStale);
        let user = UserId::new(1);
        let token = token();

        assert_eq!(registry.current(&source, Some((user, &token))).await.count, 2);
        assert_eq!(registry.current(&source, Some((user, &token))).await.count, 2);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        registry.increment(&source, user, &token, 1).await;
        assert_eq!(registry.current(&source, Some((user, &token))).await.count, 3);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        assert_eq!(registry.current(&source, None).await, CartCount::default());
    }

    #[tokio::test]
    async fn test_auth_changed() {
        let source = FakeCart::with_count(5);
        let registry = CartCountRegistry::new(FailurePolicy::RetainStale);
        let user = UserId::new(9);

        let snapshot = registry.auth_changed(&source, user, Some(&token())).await;
        assert_eq!(snapshot.count, 5);

        let snapshot = registry.auth_changed(&source, user, None).await;
        assert_eq!(snapshot.count, 0);
        assert_eq!(registry.counter(user).await.count(), 0);
    }

    #[tokio::test]
    async fn test_first_adjustment_fetches_instead_of_counting_from_zero() {
        // Cart already has 5 lines, counter was evicted or never built
        let source = FakeCart::with_count(5);
        let registry = CartCountRegistry::new(FailurePolicy::RetainStale);
        let user = UserId::new(3);
        let token = token();

        assert_eq!(registry.increment(&source, user, &token, 1).await.count, 5);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        // Now loaded: later adds are local
        assert_eq!(registry.increment(&source, user, &token, 1).await.count, 6);
        assert_eq!(registry.current(&source, Some((user, &token))).await.count, 6);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_first_read_after_counter_creation_fetches() {
        let source = FakeCart::with_count(5);
        let registry = CartCountRegistry::new(FailurePolicy::RetainStale);
        let user = UserId::new(4);

        // Something touched the counter without loading it
        let counter = registry.counter(user).await;
        assert!(!counter.is_loaded());

        let badge = registry.current(&source, Some((user, &token()))).await;
        assert_eq!(badge.count, 5);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_first_load_retries_on_next_read() {
        let source = FakeCart::with_count(2);
        source.fail.store(true, Ordering::SeqCst);
        let registry = CartCountRegistry::new(FailurePolicy::RetainStale);
        let user = UserId::new(5);
        let token = token();

        let badge = registry.current(&source, Some((user, &token))).await;
        assert!(badge.stale);

        source.fail.store(false, Ordering::SeqCst);
        let badge = registry.current(&source, Some((user, &token))).await;
        assert_eq!(badge, CartCount { count: 2, stale: false });
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("retain".parse::<FailurePolicy>().unwrap(), FailurePolicy::RetainStale);
        assert_eq!("RESET".parse::<FailurePolicy>().unwrap(), FailurePolicy::ResetToZero);
        assert!("never".parse::<FailurePolicy>().is_err());
    }
}
