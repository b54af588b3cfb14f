//! Generic in-memory cache with a fixed per-entry time-to-live.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::time::{interval_at, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How often the background sweep purges expired entries.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shortest sweep period; tokio intervals cannot tick with a zero period.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// A cached value and the instant after which it must not be served.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

type EntryMap<V> = RwLock<HashMap<String, CacheEntry<V>>>;

/// String-keyed cache where every entry lives for the same TTL.
///
/// Expired entries are never returned. They are dropped lazily by [`TtlCache::get`]
/// and periodically by a sweep task that lives exactly as long as the cache.
pub struct TtlCache<V> {
    entries: Arc<EntryMap<V>>,
    ttl: Duration,
    sweeper: CancellationToken,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache that sweeps expired entries every [`DEFAULT_SWEEP_INTERVAL`].
    pub fn new(ttl: Duration) -> Self {
        Self::with_sweep_interval(ttl, DEFAULT_SWEEP_INTERVAL)
    }

    /// Create a cache with a custom sweep interval.
    pub fn with_sweep_interval(ttl: Duration, sweep_interval: Duration) -> Self {
        let entries = Arc::new(RwLock::new(HashMap::new()));
        let sweeper = CancellationToken::new();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(sweep(
                    Arc::downgrade(&entries),
                    sweep_interval.max(MIN_SWEEP_INTERVAL),
                    sweeper.clone(),
                ));
            }
            Err(_) => {
                warn!("No Tokio runtime available, cache entries will only expire on lookup");
            }
        }

        Self {
            entries,
            ttl,
            sweeper,
        }
    }

    /// Store `value` under `key`, replacing any previous entry and restarting its TTL.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.write().insert(key.into(), entry);
    }

    /// Look up `key`, evicting the entry if it has expired.
    pub fn get(&self, key: &str) -> Option<V> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(Instant::now()) => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        // A concurrent set may have refreshed the key between the two locks.
        let mut entries = self.entries.write();
        if entries
            .get(key)
            .is_some_and(|entry| entry.is_expired(Instant::now()))
        {
            entries.remove(key);
            debug!("Evicted expired cache entry: {}", key);
        }
        None
    }

    /// Remove `key` if present.
    pub fn delete(&self, key: &str) {
        self.entries.write().remove(key);
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Raw entry count, including expired entries not yet evicted.
    pub fn size(&self) -> usize {
        self.entries.read().len()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drop every expired entry and return how many were removed.
    pub fn remove_expired(&self) -> usize {
        remove_expired(&self.entries)
    }
}

impl<V> Drop for TtlCache<V> {
    fn drop(&mut self) {
        self.sweeper.cancel();
    }
}

fn remove_expired<V>(entries: &EntryMap<V>) -> usize {
    let now = Instant::now();
    let mut entries = entries.write();
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now));
    before - entries.len()
}

async fn sweep<V>(entries: Weak<EntryMap<V>>, period: Duration, shutdown: CancellationToken) {
    let mut ticker = interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(entries) = entries.upgrade() else {
                    break;
                };
                let removed = remove_expired(&entries);
                if removed > 0 {
                    debug!("Cache sweep removed {} expired entries", removed);
                }
            }
            _ = shutdown.cancelled() => {
                break;
            }
        }
    }

    debug!("Cache sweep task stopped");
}
