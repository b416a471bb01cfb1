//! TTL caching for analysis results
//!
//! A generic [`TtlCache`] parameterized by a [`Clock`], so expiry is testable
//! without sleeping, and a [`CacheManager`] bundling the three caches the
//! analyzer consults: sentiment metrics, market matches, and predictions.
//! Cached metrics double as the previous reading when the same topic is
//! analyzed again within the TTL.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::matcher::MatchResult;
use crate::prediction::{Prediction, TimeHorizon};
use crate::sentiment::SentimentMetrics;

/// Time source for cache expiry
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock, used in production
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for expiry tests
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn advance(&self, duration: Duration) {
        *self.now.write() += duration;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// In-memory cache whose entries expire a fixed TTL after insertion.
///
/// Handles are cheap clones sharing one underlying map. Expired entries are
/// invisible to `get` immediately and reclaimed by [`cleanup`](Self::cleanup).
pub struct TtlCache<K, V> {
    entries: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            ttl: self.ttl,
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl_secs: i64) -> Self {
        Self::with_clock(ttl_secs, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl_secs: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::seconds(ttl_secs),
            clock,
        }
    }

    /// Fetch a live entry; expired and missing keys both miss
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|entry| entry.expires_at > self.clock.now())
            .map(|entry| entry.value.clone())
    }

    /// Insert or replace an entry, restarting its TTL
    pub fn put(&self, key: K, value: V) {
        let expires_at = self.clock.now() + self.ttl;
        self.entries
            .write()
            .insert(key, CacheEntry { value, expires_at });
    }

    /// Drop an entry before its TTL ends; true if one was present
    pub fn invalidate<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.write().remove(key).is_some()
    }

    /// Reclaim expired entries
    pub fn cleanup(&self) {
        let now = self.clock.now();
        self.entries.write().retain(|_, entry| entry.expires_at > now);
    }

    /// Entry count including expired but not yet reclaimed entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        let now = self.clock.now();
        let total = entries.len();
        let expired = entries.values().filter(|e| e.expires_at <= now).count();
        CacheStats {
            total_entries: total,
            expired_entries: expired,
            valid_entries: total - expired,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub valid_entries: usize,
}

/// The three caches the analyzer consults before recomputing.
///
/// Metrics and matches are keyed by topic; predictions by market key and
/// horizon, since the same market is forecast over several horizons.
#[derive(Clone)]
pub struct CacheManager {
    pub metrics: TtlCache<String, SentimentMetrics>,
    pub matches: TtlCache<String, Vec<MatchResult>>,
    pub predictions: TtlCache<(String, TimeHorizon), Prediction>,
}

impl Default for CacheManager {
    fn default() -> Self {
        // Matches change more slowly than sentiment, so they keep longer
        Self::with_ttls(300, 600, 300)
    }
}

impl CacheManager {
    pub fn with_ttls(metrics_ttl: i64, match_ttl: i64, prediction_ttl: i64) -> Self {
        Self {
            metrics: TtlCache::new(metrics_ttl),
            matches: TtlCache::new(match_ttl),
            predictions: TtlCache::new(prediction_ttl),
        }
    }

    pub fn with_clock(
        metrics_ttl: i64,
        match_ttl: i64,
        prediction_ttl: i64,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            metrics: TtlCache::with_clock(metrics_ttl, Arc::clone(&clock)),
            matches: TtlCache::with_clock(match_ttl, Arc::clone(&clock)),
            predictions: TtlCache::with_clock(prediction_ttl, clock),
        }
    }

    /// Cleanup all caches
    pub fn cleanup_all(&self) {
        self.metrics.cleanup();
        self.matches.cleanup();
        self.predictions.cleanup();
    }

    /// Start background cleanup task
    pub fn start_cleanup_task(self, interval_secs: u64) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
            loop {
                interval.tick().await;
                self.cleanup_all();
                tracing::debug!("Cache cleanup completed");
            }
        });
    }
}
