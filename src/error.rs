//! Error types for the render cache
//!
//! Provides unified error handling using thiserror.

use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache storage operations.
///
/// Only `CorruptIndex` is ever fatal: a persisted index that cannot be
/// parsed means the cache is in an unknown state and the process must not
/// start serving from it. Everything else is recoverable and handled
/// best-effort inside the facade.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Persisted index exists but cannot be parsed (fatal at startup)
    #[error("cache index {path} is corrupt: {source}")]
    CorruptIndex {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Disk read/write failure (recoverable, logged and swallowed)
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// == Result Type Alias ==
/// Convenience Result type for cache storage operations.
pub type Result<T> = std::result::Result<T, CacheError>;
