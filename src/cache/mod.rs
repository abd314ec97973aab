//! Disk-backed record cache
//!
//! Run records are downloaded as newline-delimited JSON and persisted under
//! `<cacheDir>/<version>/<circuitKind>/<algorithm>_<size>_<backend>.jsonl`.
//! A cached file is served without network access while its age (now minus
//! last-write time) is strictly below the configured TTL.
//!
//! # Fetch policy
//!
//! 1. Fresh cache file and no forced refresh: parse and return it.
//! 2. Otherwise drop any stale file and GET the URL:
//!    - 404: empty record set ("no such combination published"), nothing written
//!    - other non-2xx: [`Error::RemoteFetch`]
//!    - no response: [`Error::Connectivity`]
//!    - success: parse every non-empty line, overwrite the cache file, return
//!
//! # Concurrency
//!
//! Check, fetch and write for one cache path run under a per-path mutex, so
//! concurrent callers for the same uncached key coalesce: the first fetches,
//! the rest find a fresh file.

use crate::error::Error;
use crate::http::Transport;
use crate::model::{DatasetKey, ShotRecord};
use crate::util::time::{age, format_duration, to_utc, Clock, SystemClock};
use crate::Result;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// TTL-governed cache of run records
pub struct RecordCache {
    root: PathBuf,
    ttl: Duration,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    /// One lock per cache path currently being served
    in_flight: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl RecordCache {
    pub fn new(root: impl Into<PathBuf>, ttl: Duration, transport: Arc<dyn Transport>) -> Self {
        Self {
            root: root.into(),
            ttl,
            transport,
            clock: Arc::new(SystemClock),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the wall clock used for freshness checks
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Absolute cache path for a dataset key
    pub fn path_for(&self, key: &DatasetKey) -> PathBuf {
        self.root.join(key.cache_path())
    }

    /// Fetch the record set of `key` from below `raw_base`
    pub fn fetch_key(
        &self,
        key: &DatasetKey,
        raw_base: &str,
        force_refresh: bool,
    ) -> Result<Vec<ShotRecord>> {
        self.fetch(&key.url(raw_base), &self.path_for(key), force_refresh)
    }

    /// Serve `cache_path` if fresh, otherwise download `url` into it
    pub fn fetch(
        &self,
        url: &str,
        cache_path: &Path,
        force_refresh: bool,
    ) -> Result<Vec<ShotRecord>> {
        let key_lock = self.key_lock(cache_path);
        let result = {
            let _guard = key_lock.lock().unwrap_or_else(|e| e.into_inner());
            self.fetch_locked(url, cache_path, force_refresh)
        };
        self.release_key_lock(cache_path, key_lock);
        result
    }

    /// Whether `cache_path` exists and is younger than the TTL
    pub fn is_fresh(&self, cache_path: &Path) -> Result<bool> {
        Ok(self.entry_age(cache_path)?.map_or(false, |age| age < self.ttl))
    }

    /// Time since the entry was last written, `None` when absent
    fn entry_age(&self, cache_path: &Path) -> Result<Option<Duration>> {
        let modified = match fs::metadata(cache_path) {
            Ok(meta) => meta.modified().map_err(|e| Error::io(cache_path, e))?,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(cache_path, e)),
        };
        Ok(Some(age(to_utc(modified), self.clock.now())))
    }

    fn fetch_locked(
        &self,
        url: &str,
        cache_path: &Path,
        force_refresh: bool,
    ) -> Result<Vec<ShotRecord>> {
        let entry_age = self.entry_age(cache_path)?;
        if let Some(age) = entry_age {
            if age >= self.ttl {
                debug!(
                    path = %cache_path.display(),
                    age = %format_duration(age),
                    "cache entry expired"
                );
            }
        }
        if !force_refresh && entry_age.map_or(false, |age| age < self.ttl) {
            match self.read_cached(cache_path) {
                Ok(records) => {
                    debug!(
                        path = %cache_path.display(),
                        records = records.len(),
                        "serving records from cache"
                    );
                    return Ok(records);
                }
                Err(e) => warn!(
                    path = %cache_path.display(),
                    error = %e,
                    "unreadable cache entry, refetching"
                ),
            }
        }

        remove_if_exists(cache_path)?;

        debug!(%url, "fetching records");
        let resp = self.transport.get(url)?;
        if resp.is_not_found() {
            info!(%url, "no records published for this combination");
            return Ok(Vec::new());
        }
        let resp = resp.require_success(url)?;

        let records = ShotRecord::parse_lines(&resp.body, url)?;
        self.write_cached(cache_path, &records)?;
        debug!(path = %cache_path.display(), records = records.len(), "cached records");
        Ok(records)
    }

    fn read_cached(&self, cache_path: &Path) -> Result<Vec<ShotRecord>> {
        let text = fs::read_to_string(cache_path).map_err(|e| Error::io(cache_path, e))?;
        ShotRecord::parse_lines(&text, &cache_path.display().to_string())
    }

    fn write_cached(&self, cache_path: &Path, records: &[ShotRecord]) -> Result<()> {
        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let tmp = cache_path.with_extension("jsonl.tmp");
        fs::write(&tmp, ShotRecord::to_lines(records)?).map_err(|e| Error::io(&tmp, e))?;
        fs::rename(&tmp, cache_path).map_err(|e| Error::io(cache_path, e))?;
        Ok(())
    }

    fn key_lock(&self, cache_path: &Path) -> Arc<Mutex<()>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        in_flight
            .entry(cache_path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the per-path lock once nobody else holds or awaits it
    fn release_key_lock(&self, cache_path: &Path, key_lock: Arc<Mutex<()>>) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        // map + ours
        if Arc::strong_count(&key_lock) == 2 {
            in_flight.remove(cache_path);
        }
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "dropped stale cache entry");
            Ok(())
        }
        Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(path, e)),
    }
}
