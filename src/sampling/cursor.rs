//! Sequential read cursors
//!
//! Maps a cursor key (algorithm, size, backend, circuit kind) to the offset
//! of the next record the sequential strategy should read. The key does not
//! include the dataset version: requesting a different version set
//! reinterprets a stored offset against a different record list, which is
//! why readers always reduce it modulo the current record count.

use crate::model::CursorKey;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Thread-safe cursor map
///
/// One mutex guards the whole map; [`CursorRegistry::advance`] holds it for
/// the complete read-modify-write, so concurrent sequential readers of the
/// same key consume disjoint records.
#[derive(Debug, Default)]
pub struct CursorRegistry {
    cursors: Mutex<HashMap<CursorKey, usize>>,
}

impl CursorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CursorKey, usize>> {
        self.cursors.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Stored offset, 0 for a key never seen
    pub fn get(&self, key: &CursorKey) -> usize {
        self.lock().get(key).copied().unwrap_or(0)
    }

    pub fn set(&self, key: &CursorKey, offset: usize) {
        self.lock().insert(key.clone(), offset);
    }

    /// Atomically read the offset, run `f`, and store the offset it returns
    pub fn advance<T, F>(&self, key: &CursorKey, f: F) -> T
    where
        F: FnOnce(usize) -> (usize, T),
    {
        let mut cursors = self.lock();
        let start = cursors.get(key).copied().unwrap_or(0);
        let (next, out) = f(start);
        cursors.insert(key.clone(), next);
        debug!(
            algorithm = %key.algorithm,
            size = key.size,
            backend = %key.backend,
            start,
            next,
            "cursor advanced"
        );
        out
    }

    /// Number of keys with a stored offset
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
