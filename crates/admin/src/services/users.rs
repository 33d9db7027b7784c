//! User directory with a short-lived listing cache.
//!
//! The users page is the one admin listing that is re-read on every filter
//! change, so the full list is held for a few seconds per admin. Entries are
//! keyed by a generation that every moderation action bumps: a list fetched
//! before the action lands under the old generation and is never served.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use respawn_api::{AccessToken, BackendClient};
use respawn_core::account::User;
use respawn_core::{AccountStatus, ModerationAction, UserId};
use tracing::{debug, info, instrument};

use crate::error::{AdminError, Result};

/// Signed-in admins whose lists may be cached at once.
const MAX_CACHED_LISTS: u64 = 64;

/// Cache key: the admin who asked and the generation the list was fetched in.
type ListKey = (UserId, u64);

/// Cached user list plus moderation actions.
#[derive(Clone)]
pub struct UserDirectory {
    client: BackendClient,
    cache: Cache<ListKey, Arc<Vec<User>>>,
    generation: Arc<AtomicU64>,
}

impl UserDirectory {
    /// Create the directory; each list is kept for `ttl`.
    #[must_use]
    pub fn new(client: BackendClient, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_CACHED_LISTS)
            .time_to_live(ttl)
            .build();
        Self {
            client,
            cache,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Every user as `admin` sees them, from the cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns the backend error on a cache miss that fails.
    #[instrument(skip(self, token), fields(admin_id = %admin))]
    pub async fn list(&self, admin: UserId, token: &AccessToken) -> Result<Arc<Vec<User>>> {
        // Read before fetching so a moderation during the fetch orphans the entry
        let key = (admin, self.generation.load(Ordering::SeqCst));
        if let Some(users) = self.cache.get(&key).await {
            debug!(count = users.len(), "User list cache hit");
            return Ok(users);
        }

        let users = Arc::new(self.client.users(token).await?);
        self.cache.insert(key, Arc::clone(&users)).await;
        Ok(users)
    }

    /// A single user, looked up in the (possibly cached) list.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no user has that id.
    pub async fn get(&self, admin: UserId, token: &AccessToken, id: UserId) -> Result<User> {
        self.list(admin, token)
            .await?
            .iter()
            .find(|user| user.id == id)
            .cloned()
            .ok_or_else(|| AdminError::NotFound(format!("user {id}")))
    }

    /// Apply a moderation action and drop the cached list.
    ///
    /// Returns the status the user now has.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the cache is dropped either way.
    #[instrument(skip(self, token), fields(user_id = %id, action = action.path_segment()))]
    pub async fn moderate(
        &self,
        token: &AccessToken,
        id: UserId,
        action: ModerationAction,
    ) -> Result<AccountStatus> {
        let result = self.client.moderate_user(token, id, action).await;
        self.invalidate();
        result?;

        info!(user_id = %id, action = action.path_segment(), "User moderated");
        Ok(action.resulting_status())
    }

    /// Start a new generation and drop every cached list.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate_all();
    }

    /// Generation new lists are cached under.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use respawn_api::ApiConfig;

    fn directory() -> UserDirectory {
        let client = BackendClient::new(&ApiConfig::new("http://127.0.0.1:9".parse().unwrap()))
            .unwrap();
        UserDirectory::new(client, Duration::from_secs(30))
    }

    #[test]
    fn test_invalidate_bumps_generation() {
        let users = directory();
        assert_eq!(users.generation(), 0);
        users.invalidate();
        users.invalidate();
        assert_eq!(users.generation(), 2);
    }

    #[tokio::test]
    async fn test_list_from_old_generation_is_not_served() {
        let users = directory();
        let admin = UserId::new(1);
        let stale = Arc::new(Vec::new());

        // A fetch that started before a moderation stores under the old key
        let key = (admin, users.generation());
        users.invalidate();
        users.cache.insert(key, stale).await;

        let current = (admin, users.generation());
        assert!(users.cache.get(&current).await.is_none());
    }
}
