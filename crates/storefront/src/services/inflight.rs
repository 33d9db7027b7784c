//! Per-key in-flight guard.
//!
//! A user double-clicking "add to cart" or the favorite heart must not issue
//! two backend calls. The first call takes the key; until its guard is dropped
//! (completion, error or cancellation of the handler future) any other call
//! for the same key gets [`AlreadyPending`] and never reaches the network.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

/// Another request for the same key is still outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("A request for this item is already in progress")]
pub struct AlreadyPending;

/// Set of keys with an outstanding request.
#[derive(Debug)]
pub struct InFlight<K> {
    keys: Arc<Mutex<HashSet<K>>>,
}

impl<K> Clone for InFlight<K> {
    fn clone(&self) -> Self {
        Self {
            keys: Arc::clone(&self.keys),
        }
    }
}

impl<K> Default for InFlight<K> {
    fn default() -> Self {
        Self {
            keys: Arc::new(Mutex::new(HashSet::new())),
        }
    }
}

impl<K: Eq + Hash + Clone> InFlight<K> {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key` for the lifetime of the returned guard.
    ///
    /// # Errors
    ///
    /// Returns [`AlreadyPending`] if the key is already claimed.
    pub fn try_acquire(&self, key: K) -> Result<InFlightGuard<K>, AlreadyPending> {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(key.clone()) {
            return Err(AlreadyPending);
        }
        Ok(InFlightGuard {
            keys: Arc::clone(&self.keys),
            key: Some(key),
        })
    }

    /// Whether `key` is currently claimed.
    #[must_use]
    pub fn is_pending(&self, key: &K) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

/// Releases its key on drop.
#[derive(Debug)]
pub struct InFlightGuard<K: Eq + Hash> {
    keys: Arc<Mutex<HashSet<K>>>,
    key: Option<K>,
}

impl<K: Eq + Hash> Drop for InFlightGuard<K> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.keys
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&key);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_pending() {
        let in_flight = InFlight::new();
        let guard = in_flight.try_acquire((1, 7)).unwrap();

        assert_eq!(in_flight.try_acquire((1, 7)).unwrap_err(), AlreadyPending);
        // Different user or product is independent
        assert!(in_flight.try_acquire((2, 7)).is_ok());
        assert!(in_flight.try_acquire((1, 8)).is_ok());

        drop(guard);
        assert!(!in_flight.is_pending(&(1, 7)));
        assert!(in_flight.try_acquire((1, 7)).is_ok());
    }

    #[tokio::test]
    async fn test_released_when_future_is_cancelled() {
        let in_flight = InFlight::new();
        let clone = in_flight.clone();

        let task = tokio::spawn(async move {
            let _guard = clone.try_acquire(42_u32).unwrap();
            std::future::pending::<()>().await;
        });

        while !in_flight.is_pending(&42) {
            tokio::task::yield_now().await;
        }
        task.abort();
        let _ = task.await;

        assert!(!in_flight.is_pending(&42));
    }
}
