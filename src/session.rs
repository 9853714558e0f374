//! Session token resolution.
//!
//! Sessions are issued by an external login service. The file service only
//! needs to turn an opaque token into the owning user ID, which is what
//! [`SessionResolver`] does.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::db::DbPool;
use crate::Result;

/// Maps a session token to the user it belongs to.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Resolve `token`; `Ok(None)` when it is unknown or expired.
    async fn resolve(&self, token: &str) -> Result<Option<i64>>;
}

fn new_token() -> String {
    Uuid::new_v4().to_string()
}

/// In-process session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, i64>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token for `user_id`.
    pub async fn issue(&self, user_id: i64) -> String {
        let token = new_token();
        self.sessions.write().await.insert(token.clone(), user_id);
        token
    }

    /// Register a caller-chosen token.
    pub async fn insert(&self, token: impl Into<String>, user_id: i64) {
        self.sessions.write().await.insert(token.into(), user_id);
    }

    /// Revoke a token. Returns `false` if it was unknown.
    pub async fn revoke(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }
}

#[async_trait]
impl SessionResolver for MemorySessionStore {
    async fn resolve(&self, token: &str) -> Result<Option<i64>> {
        Ok(self.sessions.read().await.get(token).copied())
    }
}

const EXPIRES_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy)]
struct CachedSession {
    user_id: i64,
    cached_at: Instant,
    expires_at: DateTime<Utc>,
}

impl CachedSession {
    fn is_live(&self, cache_ttl: Duration) -> bool {
        self.cached_at.elapsed() < cache_ttl && self.expires_at > Utc::now()
    }
}

/// Session store backed by the `sessions` table.
///
/// Successful lookups are cached for `cache_ttl`, never past the session's
/// own expiry. A token revoked by another process may keep resolving here
/// until its entry ages out.
pub struct SqlSessionStore {
    pool: DbPool,
    cache: RwLock<HashMap<String, CachedSession>>,
    cache_ttl: Duration,
}

impl SqlSessionStore {
    pub fn new(pool: DbPool, cache_ttl: Duration) -> Self {
        Self {
            pool,
            cache: RwLock::new(HashMap::new()),
            cache_ttl,
        }
    }

    /// Issue a token for `user_id` valid for `ttl`.
    pub async fn issue(&self, user_id: i64, ttl: Duration) -> Result<String> {
        let token = new_token();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::days(1));
        let expires_at = (Utc::now() + ttl).format(EXPIRES_AT_FORMAT).to_string();

        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(&token)
            .bind(user_id)
            .bind(&expires_at)
            .execute(&self.pool)
            .await?;

        debug!(user_id, "Session issued");
        Ok(token)
    }

    /// Revoke a token. Returns `false` if it was unknown.
    pub async fn revoke(&self, token: &str) -> Result<bool> {
        self.cache.write().await.remove(token);

        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete expired sessions and drop stale cache entries. Returns the
    /// number of sessions removed.
    pub async fn purge_expired(&self) -> Result<u64> {
        let cache_ttl = self.cache_ttl;
        self.cache
            .write()
            .await
            .retain(|_, session| session.is_live(cache_ttl));

        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= datetime('now')")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn cached(&self, token: &str) -> Option<i64> {
        let cache = self.cache.read().await;
        cache
            .get(token)
            .filter(|session| session.is_live(self.cache_ttl))
            .map(|session| session.user_id)
    }
}

#[async_trait]
impl SessionResolver for SqlSessionStore {
    async fn resolve(&self, token: &str) -> Result<Option<i64>> {
        if token.is_empty() {
            return Ok(None);
        }
        if let Some(user_id) = self.cached(token).await {
            return Ok(Some(user_id));
        }

        let row: Option<(i64, String)> = sqlx::query_as(
            "SELECT user_id, expires_at FROM sessions WHERE token = ? AND expires_at > datetime('now')",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let cache_ttl = self.cache_ttl;
        let mut cache = self.cache.write().await;
        cache.retain(|_, session| session.is_live(cache_ttl));

        let Some((user_id, expires_at)) = row else {
            cache.remove(token);
            return Ok(None);
        };

        match NaiveDateTime::parse_from_str(&expires_at, EXPIRES_AT_FORMAT) {
            Ok(expires_at) => {
                cache.insert(
                    token.to_string(),
                    CachedSession {
                        user_id,
                        cached_at: Instant::now(),
                        expires_at: expires_at.and_utc(),
                    },
                );
            }
            Err(e) => debug!("Unparseable session expiry {:?}: {}", expires_at, e),
        }
        Ok(Some(user_id))
    }
}

impl std::fmt::Debug for SqlSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlSessionStore")
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemorySessionStore::new();
        let token = store.issue(7).await;

        assert_eq!(store.resolve(&token).await.unwrap(), Some(7));
        assert_eq!(store.resolve("unknown").await.unwrap(), None);

        assert!(store.revoke(&token).await);
        assert_eq!(store.resolve(&token).await.unwrap(), None);
        assert!(!store.revoke(&token).await);
    }

    #[tokio::test]
    async fn test_memory_store_as_trait_object() {
        let store = MemorySessionStore::new();
        store.insert("abc", 3).await;

        let resolver: &dyn SessionResolver = &store;
        assert_eq!(resolver.resolve("abc").await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_sql_store_issue_and_resolve() {
        let db = Database::open_in_memory().await.unwrap();
        let store = SqlSessionStore::new(db.pool().clone(), Duration::from_secs(60));

        let token = store.issue(5, Duration::from_secs(3600)).await.unwrap();
        assert_eq!(store.resolve(&token).await.unwrap(), Some(5));
        // Second lookup is served from the cache.
        assert_eq!(store.resolve(&token).await.unwrap(), Some(5));
        assert_eq!(store.resolve("unknown").await.unwrap(), None);
        assert_eq!(store.resolve("").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sql_store_revoke() {
        let db = Database::open_in_memory().await.unwrap();
        let store = SqlSessionStore::new(db.pool().clone(), Duration::from_secs(60));

        let token = store.issue(5, Duration::from_secs(3600)).await.unwrap();
        assert_eq!(store.resolve(&token).await.unwrap(), Some(5));

        assert!(store.revoke(&token).await.unwrap());
        assert_eq!(store.resolve(&token).await.unwrap(), None);
        assert!(!store.revoke(&token).await.unwrap());
    }

    #[tokio::test]
    async fn test_sql_store_expired_session() {
        let db = Database::open_in_memory().await.unwrap();
        sqlx::query(
            "INSERT INTO sessions (token, user_id, expires_at) VALUES ('old', 9, '2000-01-01 00:00:00')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let store = SqlSessionStore::new(db.pool().clone(), Duration::from_secs(60));
        assert_eq!(store.resolve("old").await.unwrap(), None);

        let live = store.issue(9, Duration::from_secs(3600)).await.unwrap();
        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert_eq!(store.resolve(&live).await.unwrap(), Some(9));
    }

    #[tokio::test]
    async fn test_sql_store_cache_drops_aged_entries() {
        let db = Database::open_in_memory().await.unwrap();
        let store = SqlSessionStore::new(db.pool().clone(), Duration::from_millis(50));

        let first = store.issue(1, Duration::from_secs(3600)).await.unwrap();
        let second = store.issue(2, Duration::from_secs(3600)).await.unwrap();

        assert_eq!(store.resolve(&first).await.unwrap(), Some(1));
        assert!(store.cache.read().await.contains_key(&first));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(store.resolve(&second).await.unwrap(), Some(2));

        let cache = store.cache.read().await;
        assert!(!cache.contains_key(&first));
        assert!(cache.contains_key(&second));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_sql_store_purge_clears_cache() {
        let db = Database::open_in_memory().await.unwrap();
        let store = SqlSessionStore::new(db.pool().clone(), Duration::from_millis(20));

        let token = store.issue(3, Duration::from_secs(3600)).await.unwrap();
        assert_eq!(store.resolve(&token).await.unwrap(), Some(3));

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(store.purge_expired().await.unwrap(), 0);
        assert!(store.cache.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_sql_store_cache_respects_session_expiry() {
        let db = Database::open_in_memory().await.unwrap();
        let store = SqlSessionStore::new(db.pool().clone(), Duration::from_secs(3600));

        store.cache.write().await.insert(
            "lapsed".to_string(),
            CachedSession {
                user_id: 4,
                cached_at: Instant::now(),
                expires_at: Utc::now() - chrono::Duration::seconds(1),
            },
        );

        assert_eq!(store.resolve("lapsed").await.unwrap(), None);
        assert!(!store.cache.read().await.contains_key("lapsed"));
    }

    #[tokio::test]
    async fn test_sql_store_caches_expiry_from_table() {
        let db = Database::open_in_memory().await.unwrap();
        let store = SqlSessionStore::new(db.pool().clone(), Duration::from_secs(3600));

        let token = store.issue(6, Duration::from_secs(120)).await.unwrap();
        assert_eq!(store.resolve(&token).await.unwrap(), Some(6));

        let cache = store.cache.read().await;
        let cached = cache.get(&token).unwrap();
        assert!(cached.expires_at > Utc::now());
        assert!(cached.expires_at <= Utc::now() + chrono::Duration::seconds(121));
    }
}
