//! Cache Facade Module
//!
//! The read/write contract consumed by the request pipeline: lookup-or-miss,
//! store-on-success, bypass-on-demand. Combines the persistent entry store
//! with LRU re-promotion, lazy TTL expiry, and key normalization.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheStats, EntryStore};
use crate::error::Result;

// == Cached Page ==
/// A cache hit as handed back to the request pipeline.
#[derive(Debug, Clone)]
pub struct CachedPage {
    /// Response headers to apply, as stored
    pub headers: HashMap<String, String>,
    /// Response body from the content blob
    pub body: String,
    /// When the entry was last (re)written, Unix milliseconds
    pub saved_at: u64,
}

// == Page Cache ==
/// Bounded, LRU-ordered, TTL-expiring page cache backed by disk.
///
/// One instance is opened at process start and shared across request
/// handlers; every mutation sequence (find, remove, re-append, persist)
/// must run under a single exclusive borrow, which the caller gets for
/// free by wrapping the cache in a write lock.
#[derive(Debug)]
pub struct PageCache {
    store: EntryStore,
    stats: CacheStats,
    max_entries: usize,
    ttl_ms: u64,
}

impl PageCache {
    // == Open ==
    /// Opens (or initializes) the cache in `dir`.
    ///
    /// Propagates a corrupt-index error rather than serving from a cache
    /// in an unknown state.
    pub fn open(dir: &Path, max_entries: usize, ttl_ms: u64) -> Result<Self> {
        let store = EntryStore::load(dir)?;
        let mut stats = CacheStats::new();
        stats.set_entries(store.len());
        Ok(Self {
            store,
            stats,
            max_entries,
            ttl_ms,
        })
    }

    // == Lookup ==
    /// Looks up a request URL, returning the cached page on a fresh hit.
    ///
    /// `bypass` forces a miss without touching the store. Otherwise the key
    /// is normalized and scanned for: an expired match is dropped from the
    /// ordering (its blob is left orphaned) and counts as a miss; a fresh
    /// match is re-promoted to the most-recently-used position. A hit whose
    /// content blob is missing or unreadable degrades to a miss so the
    /// caller regenerates instead of failing the request.
    pub fn lookup(&mut self, request_url: &str, bypass: bool) -> Option<CachedPage> {
        if bypass {
            debug!(url = request_url, "cache bypass requested");
            self.stats.record_miss();
            return None;
        }

        let key = normalize_key(request_url);
        let Some(pos) = self.store.find(&key) else {
            self.stats.record_miss();
            return None;
        };

        let now = current_timestamp_ms();
        if self.store.get(pos).is_expired(self.ttl_ms, now) {
            // Invalidated on read: removed from the ordering, not re-inserted.
            let stale = self.store.remove(pos);
            debug!(url = %stale.url, "expired entry dropped on lookup");
            self.persist_best_effort();
            self.stats.set_entries(self.store.len());
            self.stats.record_miss();
            return None;
        }

        // Fresh hit: move to the most-recently-used end.
        let entry = self.store.remove(pos);
        let page = self.read_page(&entry);
        self.store.append(entry);
        self.persist_best_effort();

        match page {
            Some(page) => {
                self.stats.record_hit();
                Some(page)
            }
            None => {
                // Blob unreadable; the next store() replaces this entry.
                self.stats.record_miss();
                None
            }
        }
    }

    // == Store ==
    /// Stores a freshly rendered page under the normalized key.
    ///
    /// Writes the body to a new content blob, replaces any existing entry
    /// with the same key (keys stay unique via lookup-then-replace), evicts
    /// the least-recently-used entry when at capacity, appends with
    /// `saved = now`, and rewrites the index. I/O failures are logged and
    /// swallowed: the cache is best-effort and never fails a request.
    pub fn store(&mut self, request_url: &str, headers: HashMap<String, String>, body: &str) {
        if let Err(e) = self.try_store(request_url, headers, body) {
            warn!(url = request_url, error = %e, "failed to store cache entry");
        }
    }

    fn try_store(
        &mut self,
        request_url: &str,
        headers: HashMap<String, String>,
        body: &str,
    ) -> Result<()> {
        let key = normalize_key(request_url);
        let file_id = Uuid::new_v4().to_string();

        self.store.write_content(&file_id, body)?;

        // Replace an existing entry for this key; its old blob is orphaned.
        if let Some(pos) = self.store.find(&key) {
            self.store.remove(pos);
        }

        if self.store.len() >= self.max_entries {
            if let Some(evicted) = self.store.remove_oldest() {
                debug!(url = %evicted.url, "evicted least-recently-used entry");
                self.stats.record_eviction();
            }
        }

        self.store.append(CacheEntry::new(key, headers, file_id));
        self.stats.set_entries(self.store.len());
        self.store.persist()?;
        Ok(())
    }

    // == Accessors ==
    /// Current counters, with the entry count refreshed.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_entries(self.store.len());
        stats
    }

    /// Number of live entries in the index.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    // == Internals ==
    fn read_page(&self, entry: &CacheEntry) -> Option<CachedPage> {
        match self.store.read_content(&entry.file_id) {
            Ok(body) => Some(CachedPage {
                headers: entry.headers.clone(),
                body,
                saved_at: entry.saved,
            }),
            Err(e) => {
                warn!(url = %entry.url, file_id = %entry.file_id, error = %e,
                    "content blob unreadable, treating as miss");
                None
            }
        }
    }

    fn persist_best_effort(&self) {
        if let Err(e) = self.store.persist() {
            // In-memory ordering may diverge from disk until the next
            // successful persist.
            warn!(error = %e, "failed to persist cache index");
        }
    }
}

// == Key Normalization ==
/// Normalizes a request URL into a cache key.
///
/// Strips the bypass-control parameter (`refreshCache=true` or
/// `refreshCache=false`, with a surrounding `&` when present) and a single
/// resulting trailing `?`, so the same logical request always maps to the
/// same key whether or not a refresh was forced.
pub fn normalize_key(request_url: &str) -> String {
    static BYPASS_PARAM: OnceLock<Regex> = OnceLock::new();
    let re = BYPASS_PARAM.get_or_init(|| {
        Regex::new(r"&refreshCache=(?:true|false)|refreshCache=(?:true|false)&?")
            .expect("bypass parameter pattern is valid")
    });

    let stripped = re.replace_all(request_url, "");
    stripped
        .strip_suffix('?')
        .unwrap_or(&stripped)
        .to_string()
}
