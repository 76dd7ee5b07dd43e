//! Render Cache - a disk-backed page cache for rendered responses
//!
//! Stores the output of an expensive rendering pipeline on disk, keyed by
//! normalized request URL, and serves cached copies until they expire or
//! are evicted (LRU, bounded entry count, lazy TTL expiry).

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod render;

pub use api::AppState;
pub use cache::PageCache;
pub use config::Config;
