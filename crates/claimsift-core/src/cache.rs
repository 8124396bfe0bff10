//! In-memory cache of extracted PDF content.
//!
//! Keys are SHA-224 hex digests of the raw PDF bytes, so identical uploads
//! map to the same entry regardless of filename. The cache is unbounded and
//! lives for the process lifetime: no eviction, no TTL, no persistence.
//! Only successful extractions are inserted; failures never enter the cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use sha2::{Digest, Sha224};

use crate::PdfSection;

/// SHA-224 hex digest of a byte buffer. Used as the content cache key.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha224::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Thread-safe map from content hash to extracted sections.
///
/// Backed by a [`DashMap`] for lock-free concurrent access from request
/// handlers. Sections are stored behind an [`Arc`] so hits hand out a cheap
/// clone instead of copying the section list.
pub struct ContentCache {
    entries: DashMap<String, Arc<Vec<PdfSection>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ContentCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up the sections cached under `hash`.
    pub fn get(&self, hash: &str) -> Option<Arc<Vec<PdfSection>>> {
        match self.entries.get(hash) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(hash, "content cache hit");
                Some(Arc::clone(entry.value()))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(hash, "content cache miss");
                None
            }
        }
    }

    /// Store `sections` under `hash`, returning the shared handle.
    pub fn insert(&self, hash: String, sections: Vec<PdfSection>) -> Arc<Vec<PdfSection>> {
        tracing::trace!(hash = %hash, sections = sections.len(), "content cache insert");
        let sections = Arc::new(sections);
        self.entries.insert(hash, Arc::clone(&sections));
        sections
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of cache hits since creation.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of cache misses since creation.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentCache")
            .field("entries", &self.entries.len())
            .field("hits", &self.hits())
            .field("misses", &self.misses())
            .finish()
    }
}
