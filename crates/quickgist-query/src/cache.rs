use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard as StdMutexGuard};
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

/// How long a successful read is reused before it is fetched again.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(5 * 60);

struct Entry<V> {
    value: V,
    fetched_at: Instant,
    stale: bool,
}

/// Where a value returned by [`QueryCache::fetch_with`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Network,
}

/// Fetch lock and invalidation counter for one key. Lives only while a
/// fetch of the key is running or waiting.
#[derive(Default)]
struct KeySlot {
    fetch: Mutex<()>,
    generation: AtomicU64,
}

/// Keyed cache of successful reads with a freshness window.
///
/// Concurrent fetches for the same key are serialized on a per-key lock, so
/// only the first one reaches the network and the rest observe its result.
/// Different keys never wait on each other. Errors are never cached.
///
/// A fetch that was already running when its key was invalidated still
/// returns its value, but the value is stored stale so the next read goes
/// back to the network.
pub struct QueryCache<K, V> {
    freshness: Duration,
    entries: RwLock<HashMap<K, Entry<V>>>,
    slots: StdMutex<HashMap<K, Arc<KeySlot>>>,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(freshness: Duration) -> Self {
        Self {
            freshness,
            entries: RwLock::new(HashMap::new()),
            slots: StdMutex::new(HashMap::new()),
        }
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    /// Cached value for `key` if it is neither stale nor older than the
    /// freshness window.
    pub async fn get_fresh(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.stale || entry.fetched_at.elapsed() >= self.freshness {
            return None;
        }
        Some(entry.value.clone())
    }

    pub async fn insert(&self, key: K, value: V) {
        self.store(key, value, false).await;
    }

    /// Mark `key` stale so the next read refetches it. Returns whether an
    /// entry existed.
    ///
    /// A fetch of `key` that is in flight right now will not be cached as
    /// fresh.
    pub async fn invalidate(&self, key: &K) -> bool {
        if let Some(slot) = self.lock_slots().get(key) {
            slot.generation.fetch_add(1, Ordering::SeqCst);
        }

        match self.entries.write().await.get_mut(key) {
            Some(entry) => {
                entry.stale = true;
                true
            }
            None => false,
        }
    }

    /// Number of keys with a fetch running or waiting.
    pub fn keys_in_flight(&self) -> usize {
        self.lock_slots().len()
    }

    /// Return the fresh cached value for `key`, or run `fetch` and cache its
    /// result.
    pub async fn fetch_with<F, Fut, E>(&self, key: K, fetch: F) -> Result<(V, Origin), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get_fresh(&key).await {
            return Ok((value, Origin::Cache));
        }

        let slot = SlotHandle::acquire(self, key.clone());
        let _guard = slot.slot.fetch.lock().await;

        // Another caller may have filled the entry while we waited.
        if let Some(value) = self.get_fresh(&key).await {
            return Ok((value, Origin::Cache));
        }

        let generation = slot.slot.generation.load(Ordering::SeqCst);
        let value = fetch().await?;
        let invalidated = slot.slot.generation.load(Ordering::SeqCst) != generation;
        if invalidated {
            tracing::debug!("key invalidated during fetch; result stored stale");
        }
        self.store(key, value.clone(), invalidated).await;
        Ok((value, Origin::Network))
    }

    async fn store(&self, key: K, value: V, stale: bool) {
        self.entries.write().await.insert(
            key,
            Entry {
                value,
                fetched_at: Instant::now(),
                stale,
            },
        );
    }

    fn lock_slots(&self) -> StdMutexGuard<'_, HashMap<K, Arc<KeySlot>>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<K, V> Default for QueryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_FRESHNESS)
    }
}

/// A handle on a key's slot. Dropping the last handle removes the slot,
/// including when the fetch is cancelled.
struct SlotHandle<'a, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    cache: &'a QueryCache<K, V>,
    key: K,
    slot: Arc<KeySlot>,
}

impl<'a, K, V> SlotHandle<'a, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn acquire(cache: &'a QueryCache<K, V>, key: K) -> Self {
        let slot = cache.lock_slots().entry(key.clone()).or_default().clone();
        Self { cache, key, slot }
    }
}

impl<K, V> Drop for SlotHandle<'_, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn drop(&mut self) {
        let mut slots = self.cache.lock_slots();
        // The map's own handle plus ours: nobody else is waiting.
        if slots
            .get(&self.key)
            .is_some_and(|slot| Arc::strong_count(slot) <= 2)
        {
            slots.remove(&self.key);
        }
    }
}
