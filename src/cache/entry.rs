//! Cache Entry Module
//!
//! Defines the persisted record for a single cached page.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// One cached response, as serialized into the on-disk index.
///
/// Field names are part of the persisted format and must not change:
/// the index file is a JSON array of `{saved, headers, fileId, url}`
/// records, and the body lives in a separate `{fileId}.html` blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Timestamp of the last (re)write, Unix milliseconds
    pub saved: u64,
    /// Response headers, name -> value, case preserved as received
    pub headers: HashMap<String, String>,
    /// Opaque identifier naming the content blob for this entry
    #[serde(rename = "fileId")]
    pub file_id: String,
    /// Normalized cache key (request URL with the bypass parameter stripped)
    pub url: String,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(url: String, headers: HashMap<String, String>, file_id: String) -> Self {
        Self {
            saved: current_timestamp_ms(),
            headers,
            file_id,
            url,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is stale at `now`.
    ///
    /// An entry is expired iff `now > saved + ttl_ms` (strictly greater):
    /// at exactly `saved + ttl_ms` the entry is still a hit.
    pub fn is_expired(&self, ttl_ms: u64, now: u64) -> bool {
        now > self.saved.saturating_add(ttl_ms)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn entry_at(saved: u64) -> CacheEntry {
        CacheEntry {
            saved,
            headers: HashMap::new(),
            file_id: "blob".to_string(),
            url: "/page".to_string(),
        }
    }

    #[test]
    fn test_fresh_entry_not_expired() {
        let entry = CacheEntry::new("/page".to_string(), HashMap::new(), "id".to_string());
        assert!(!entry.is_expired(86_400_000, current_timestamp_ms()));
    }

    #[test]
    fn test_expiry_boundary_is_strict() {
        let entry = entry_at(1_000);

        // Exactly at saved + ttl the entry is still fresh
        assert!(!entry.is_expired(500, 1_500));
        // One millisecond past the deadline it is stale
        assert!(entry.is_expired(500, 1_501));
        // Well before the deadline it is fresh
        assert!(!entry.is_expired(500, 1_499));
    }

    #[test]
    fn test_serde_field_names_match_disk_format() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "text/html".to_string());
        let entry = CacheEntry {
            saved: 42,
            headers,
            file_id: "abc-123".to_string(),
            url: "/docs".to_string(),
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"saved\":42"));
        assert!(json.contains("\"fileId\":\"abc-123\""));
        assert!(json.contains("\"url\":\"/docs\""));
        // Header name casing is preserved
        assert!(json.contains("Content-Type"));

        let back: CacheEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.file_id, "abc-123");
        assert_eq!(back.saved, 42);
    }
}
