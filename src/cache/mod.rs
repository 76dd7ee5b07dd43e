//! Cache Module
//!
//! Disk-backed page caching with lazy TTL expiry and LRU eviction.

mod entry;
mod facade;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use facade::{normalize_key, CachedPage, PageCache};
pub use stats::CacheStats;
pub use store::EntryStore;

// == Public Constants ==
/// Default maximum number of cache entries
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Default entry time-to-live: 24 hours in milliseconds
pub const DEFAULT_TTL_MS: u64 = 86_400_000;
