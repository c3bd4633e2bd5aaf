//! Redis-backed stats cache.
//!
//! Keys follow `stats:{PLATFORM}:{videoId}`; values are JSON-serialized
//! [`PlatformStats`]; every write carries a fixed one-hour TTL. The cache is
//! advisory — a miss, an expired key, or an undecodable value all read as
//! "absent", and correctness never depends on the cache being warm.

use async_trait::async_trait;
use clipstats_core::{Platform, PlatformStats};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use thiserror::Error;

/// TTL applied on every cache write, in seconds.
pub const STATS_TTL_SECS: u64 = 3600;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Keyed read/write contract for the stats cache.
///
/// The collector only sees this trait, so tests can substitute an in-memory
/// double for the Redis implementation.
#[async_trait]
pub trait StatsCache: Send + Sync {
    /// Look up the last-known counters for a video. Absent, expired, and
    /// undecodable entries all return `Ok(None)` — a decode failure is logged
    /// but never propagated.
    async fn get(
        &self,
        platform: Platform,
        video_id: &str,
    ) -> Result<Option<PlatformStats>, CacheError>;

    /// Store counters under the video's key with the fixed TTL.
    async fn set(
        &self,
        platform: Platform,
        video_id: &str,
        stats: &PlatformStats,
    ) -> Result<(), CacheError>;
}

#[must_use]
pub fn stats_key(platform: Platform, video_id: &str) -> String {
    format!("stats:{}:{video_id}", platform.as_str())
}

/// Production cache over a shared Redis connection manager.
#[derive(Clone)]
pub struct RedisStatsCache {
    conn: ConnectionManager,
}

impl RedisStatsCache {
    /// Connect to Redis and build the managed connection.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Redis`] if the URL is invalid or the initial
    /// connection fails.
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    #[must_use]
    pub fn from_connection(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl StatsCache for RedisStatsCache {
    async fn get(
        &self,
        platform: Platform,
        video_id: &str,
    ) -> Result<Option<PlatformStats>, CacheError> {
        let key = stats_key(platform, video_id);
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(&key).await?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        match serde_json::from_str::<PlatformStats>(&raw) {
            Ok(stats) => Ok(Some(stats)),
            Err(e) => {
                tracing::warn!(key, error = %e, "cache entry is not valid PlatformStats JSON");
                Ok(None)
            }
        }
    }

    async fn set(
        &self,
        platform: Platform,
        video_id: &str,
        stats: &PlatformStats,
    ) -> Result<(), CacheError> {
        let key = stats_key(platform, video_id);
        let value = serde_json::to_string(stats)?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(&key, value, STATS_TTL_SECS).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_format_is_fixed() {
        assert_eq!(stats_key(Platform::Youtube, "abc"), "stats:YOUTUBE:abc");
        assert_eq!(
            stats_key(Platform::Tiktok, "7301234567890"),
            "stats:TIKTOK:7301234567890"
        );
    }

    #[test]
    fn ttl_is_one_hour() {
        assert_eq!(STATS_TTL_SECS, 3600);
    }
}
