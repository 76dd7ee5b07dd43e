//! Entry Store Module
//!
//! The persistent LRU-ordered index plus per-entry content blobs on disk.
//!
//! The index is a single JSON array of [`CacheEntry`] records where position
//! encodes recency: index 0 is the least-recently-used entry, the last index
//! is the most-recently-used. The body of each entry lives next to the index
//! as `{fileId}.html`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

const INDEX_FILE: &str = "index.json";

// == Entry Store ==
/// Ordered cache index backed by one directory on disk.
#[derive(Debug)]
pub struct EntryStore {
    /// Cache directory holding the index file and content blobs
    dir: PathBuf,
    /// Entries ordered oldest (index 0) to most recently used (last)
    entries: Vec<CacheEntry>,
}

impl EntryStore {
    // == Load ==
    /// Loads the persisted index from `dir`, creating the directory (and an
    /// empty store) if nothing has been persisted yet.
    ///
    /// A present-but-unparsable index is a fatal startup error: serving from
    /// a cache in an unknown state is worse than refusing to start.
    pub fn load(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;

        let index_path = dir.join(INDEX_FILE);
        let entries = match fs::read(&index_path) {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|source| CacheError::CorruptIndex {
                    path: index_path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            dir: dir.to_path_buf(),
            entries,
        })
    }

    // == Find ==
    /// Returns the position of the entry with the given key, if present.
    ///
    /// A linear scan by key equality; positions are only valid until the
    /// next mutation.
    pub fn find(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.url == key)
    }

    /// Returns the entry at `pos`.
    pub fn get(&self, pos: usize) -> &CacheEntry {
        &self.entries[pos]
    }

    // == Remove ==
    /// Removes and returns the entry at `pos`, shifting later entries down.
    pub fn remove(&mut self, pos: usize) -> CacheEntry {
        self.entries.remove(pos)
    }

    /// Removes and returns the least-recently-used entry (index 0).
    pub fn remove_oldest(&mut self) -> Option<CacheEntry> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    // == Append ==
    /// Adds an entry at the most-recently-used end.
    pub fn append(&mut self, entry: CacheEntry) {
        self.entries.push(entry);
    }

    // == Persist ==
    /// Serializes the full ordered sequence and replaces the index file.
    ///
    /// Writes to a temp file first and renames over the index so a
    /// concurrent reader never observes a half-written file.
    pub fn persist(&self) -> Result<()> {
        let index_path = self.dir.join(INDEX_FILE);
        let tmp_path = self.dir.join(format!("{INDEX_FILE}.tmp"));

        let bytes = serde_json::to_vec(&self.entries)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if let Err(e) = fs::write(&tmp_path, bytes) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        fs::rename(&tmp_path, &index_path)?;
        Ok(())
    }

    // == Content Blobs ==
    /// Reads the content blob for `file_id`.
    pub fn read_content(&self, file_id: &str) -> io::Result<String> {
        fs::read_to_string(self.content_path(file_id))
    }

    /// Writes `body` as a new content blob under `file_id`.
    pub fn write_content(&self, file_id: &str, body: &str) -> io::Result<()> {
        fs::write(self.content_path(file_id), body)
    }

    fn content_path(&self, file_id: &str) -> PathBuf {
        self.dir.join(format!("{file_id}.html"))
    }

    // == Length ==
    /// Returns the current number of entries in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries oldest first.
    #[allow(dead_code)]
    pub fn iter(&self) -> impl Iterator<Item = &CacheEntry> {
        self.entries.iter()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn entry(url: &str, file_id: &str) -> CacheEntry {
        CacheEntry::new(url.to_string(), HashMap::new(), file_id.to_string())
    }

    #[test]
    fn test_load_creates_empty_store() {
        let dir = tempdir().unwrap();
        let cache_dir = dir.path().join("fresh");

        let store = EntryStore::load(&cache_dir).unwrap();
        assert!(store.is_empty());
        assert!(cache_dir.is_dir(), "backing directory should be created");
    }

    #[test]
    fn test_persist_and_reload_preserves_order() {
        let dir = tempdir().unwrap();

        let mut store = EntryStore::load(dir.path()).unwrap();
        store.append(entry("/a", "id-a"));
        store.append(entry("/b", "id-b"));
        store.append(entry("/c", "id-c"));
        store.persist().unwrap();

        let reloaded = EntryStore::load(dir.path()).unwrap();
        assert_eq!(reloaded.len(), 3);
        assert_eq!(reloaded.get(0).url, "/a");
        assert_eq!(reloaded.get(2).url, "/c");
    }

    #[test]
    fn test_persist_leaves_no_temp_file() {
        let dir = tempdir().unwrap();

        let mut store = EntryStore::load(dir.path()).unwrap();
        store.append(entry("/a", "id-a"));
        store.persist().unwrap();

        assert!(dir.path().join("index.json").exists());
        assert!(!dir.path().join("index.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_index_is_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("index.json"), b"not json at all").unwrap();

        let result = EntryStore::load(dir.path());
        assert!(matches!(result, Err(CacheError::CorruptIndex { .. })));
    }

    #[test]
    fn test_find_by_key() {
        let dir = tempdir().unwrap();
        let mut store = EntryStore::load(dir.path()).unwrap();
        store.append(entry("/a", "id-a"));
        store.append(entry("/b", "id-b"));

        assert_eq!(store.find("/b"), Some(1));
        assert_eq!(store.find("/a"), Some(0));
        assert_eq!(store.find("/missing"), None);
    }

    #[test]
    fn test_remove_oldest_is_index_zero() {
        let dir = tempdir().unwrap();
        let mut store = EntryStore::load(dir.path()).unwrap();
        store.append(entry("/a", "id-a"));
        store.append(entry("/b", "id-b"));

        let oldest = store.remove_oldest().unwrap();
        assert_eq!(oldest.url, "/a");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_oldest_empty() {
        let dir = tempdir().unwrap();
        let mut store = EntryStore::load(dir.path()).unwrap();
        assert!(store.remove_oldest().is_none());
    }

    #[test]
    fn test_content_blob_round_trip() {
        let dir = tempdir().unwrap();
        let store = EntryStore::load(dir.path()).unwrap();

        store.write_content("blob-1", "<html>hi</html>").unwrap();
        let body = store.read_content("blob-1").unwrap();
        assert_eq!(body, "<html>hi</html>");
        assert!(dir.path().join("blob-1.html").exists());
    }

    #[test]
    fn test_read_missing_blob_errors() {
        let dir = tempdir().unwrap();
        let store = EntryStore::load(dir.path()).unwrap();
        assert!(store.read_content("no-such-blob").is_err());
    }
}
