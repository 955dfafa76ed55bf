//! Server-side session store.
//!
//! Opaque random tokens map to user ids in an LRU cache with a TTL. The
//! cookie only ever carries the token.

use lru::LruCache;
use rand::RngCore;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone)]
struct SessionEntry {
    user_id: i64,
    created_at: Instant,
}

/// LRU-based session store with TTL
#[derive(Clone)]
pub struct SessionStore {
    cache: Arc<Mutex<LruCache<String, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    /// * `capacity` - Maximum live sessions (clamped to at least 1)
    /// * `ttl` - Session lifetime from login
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for `user_id` and return its token
    pub async fn create(&self, user_id: i64) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let mut cache = self.cache.lock().await;
        cache.put(
            token.clone(),
            SessionEntry {
                user_id,
                created_at: Instant::now(),
            },
        );
        debug!("Session started for user {} ({})", user_id, mask_token(&token));
        token
    }

    /// Resolve a token to its user id. Expired sessions are dropped.
    pub async fn user_id(&self, token: &str) -> Option<i64> {
        let mut cache = self.cache.lock().await;
        let entry = cache.get(token)?;
        if entry.created_at.elapsed() < self.ttl {
            return Some(entry.user_id);
        }
        cache.pop(token);
        None
    }

    /// End a session. Returns whether it existed.
    pub async fn remove(&self, token: &str) -> bool {
        self.cache.lock().await.pop(token).is_some()
    }

    /// End every session belonging to `user_id`
    pub async fn remove_user(&self, user_id: i64) -> usize {
        let mut cache = self.cache.lock().await;
        let tokens: Vec<String> = cache
            .iter()
            .filter(|(_, entry)| entry.user_id == user_id)
            .map(|(token, _)| token.clone())
            .collect();
        for token in &tokens {
            cache.pop(token);
        }
        tokens.len()
    }

    /// Prune expired entries (called periodically)
    pub async fn prune_expired(&self) -> usize {
        let mut cache = self.cache.lock().await;
        let expired: Vec<String> = cache
            .iter()
            .filter(|(_, entry)| entry.created_at.elapsed() >= self.ttl)
            .map(|(token, _)| token.clone())
            .collect();
        for token in &expired {
            cache.pop(token);
        }
        expired.len()
    }

    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Mask token for logging (show first 8 chars only)
pub fn mask_token(token: &str) -> String {
    match token.get(..8) {
        Some(prefix) if token.len() > 8 => format!("{}...", prefix),
        _ => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_lookup() {
        let store = SessionStore::new(100, Duration::from_secs(60));
        let token = store.create(7).await;
        assert_eq!(token.len(), 64);
        assert_eq!(store.user_id(&token).await, Some(7));
        assert_eq!(store.user_id("unknown").await, None);
    }

    #[tokio::test]
    async fn test_session_expiration() {
        let store = SessionStore::new(100, Duration::from_millis(100));
        let token = store.create(1).await;
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(store.user_id(&token).await, None);
        assert!(store.is_empty().await, "expired session should be dropped on lookup");
    }

    #[tokio::test]
    async fn test_prune_expired() {
        let store = SessionStore::new(100, Duration::from_millis(50));
        store.create(1).await;
        store.create(2).await;
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(store.prune_expired().await, 2);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let store = SessionStore::new(2, Duration::from_secs(60));
        let first = store.create(1).await;
        let second = store.create(2).await;
        let third = store.create(3).await; // evicts first

        assert_eq!(store.user_id(&first).await, None);
        assert_eq!(store.user_id(&second).await, Some(2));
        assert_eq!(store.user_id(&third).await, Some(3));
    }

    #[tokio::test]
    async fn test_remove_user_drops_all_sessions() {
        let store = SessionStore::new(10, Duration::from_secs(60));
        let a = store.create(5).await;
        let b = store.create(5).await;
        let other = store.create(6).await;

        assert_eq!(store.remove_user(5).await, 2);
        assert_eq!(store.user_id(&a).await, None);
        assert_eq!(store.user_id(&b).await, None);
        assert_eq!(store.user_id(&other).await, Some(6));
        assert!(store.remove(&other).await);
        assert!(!store.remove(&other).await);
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("0123456789abcdef"), "01234567...");
        assert_eq!(mask_token("short"), "***");
    }
}
