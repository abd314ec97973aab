//! Bounded memo for catalog lookups
//!
//! Catalog indexes and metadata documents are immutable per dataset version,
//! so the service remembers them instead of walking the remote tree again.
//! The memo holds at most `capacity` entries and evicts the least recently
//! used one when full. Nothing expires on its own: callers clear it through
//! [`MemoCache::clear`] or [`MemoCache::invalidate`].

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

struct Entry<V> {
    value: V,
    last_access: u64,
}

struct Inner<K, V> {
    entries: HashMap<K, Entry<V>>,
    tick: u64,
}

/// Thread-safe LRU memo
pub struct MemoCache<K, V> {
    name: &'static str,
    capacity: usize,
    inner: Mutex<Inner<K, V>>,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            capacity: capacity.max(1),
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                tick: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<K, V>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.lock();
        inner.tick += 1;
        let tick = inner.tick;
        inner.entries.get_mut(key).map(|entry| {
            entry.last_access = tick;
            entry.value.clone()
        })
    }

    pub fn insert(&self, key: K, value: V) {
        let mut inner = self.lock();
        inner.tick += 1;
        let tick = inner.tick;

        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.capacity {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_access)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                debug!(memo = self.name, key = ?oldest, "memo entry evicted");
                inner.entries.remove(&oldest);
            }
        }

        inner.entries.insert(
            key,
            Entry {
                value,
                last_access: tick,
            },
        );
    }

    /// Return the memoized value or compute, store and return it
    ///
    /// The lock is not held while `compute` runs, so two threads missing the
    /// same key may both compute it; the later insert wins. Errors are not
    /// memoized.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            debug!(memo = self.name, key = ?key, "memo hit");
            return Ok(value);
        }
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn invalidate(&self, key: &K) -> bool {
        self.lock().entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        if !inner.entries.is_empty() {
            debug!(memo = self.name, entries = inner.entries.len(), "memo cleared");
        }
        inner.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
