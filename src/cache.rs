//! Optional memoization of load results keyed by source fingerprint.
//!
//! Loading is pure, so two sources with the same bytes and options always
//! canonicalize identically. Callers that query the same source repeatedly
//! can route through [`SeriesCache`] to skip re-parsing.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use log::debug;
use sha2::{Digest, Sha256};

use crate::{
    error::LoadError,
    loader::{self, LoadOptions},
    series::{CanonicalSeries, TimeSeriesSummary},
};

pub type CachedLoad = Arc<(CanonicalSeries, TimeSeriesSummary)>;

/// SHA-256 of the source bytes, lower-case hex.
pub fn fingerprint(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn cache_key(bytes: &[u8], options: &LoadOptions) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.update([options.delimiter]);
    hasher.update(options.encoding.name().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Unbounded map from source key to load result.
///
/// Entries live until [`SeriesCache::clear`] or drop; the owner decides how
/// long a cache is kept around.
#[derive(Debug, Default)]
pub struct SeriesCache {
    entries: Mutex<HashMap<String, CachedLoad>>,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached load for these bytes, loading on a miss.
    ///
    /// Failed loads are not cached.
    pub fn load(&self, bytes: &[u8], options: &LoadOptions) -> Result<CachedLoad, LoadError> {
        loader::check_size(bytes.len(), options)?;
        let key = cache_key(bytes, options);
        if let Some(hit) = self.lock().get(&key) {
            debug!("Series cache hit for {key}");
            return Ok(Arc::clone(hit));
        }
        // Parse outside the lock; concurrent misses on the same key both load.
        let loaded: CachedLoad = Arc::new(loader::load_with(bytes, options)?);
        self.lock().insert(key, Arc::clone(&loaded));
        Ok(loaded)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CachedLoad>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_hex() {
        assert_eq!(
            fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn repeated_loads_share_one_entry() {
        let cache = SeriesCache::new();
        let options = LoadOptions::default();
        let first = cache.load(b"time,value\n0,1\n", &options).unwrap();
        let second = cache.load(b"time,value\n0,1\n", &options).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn delimiter_is_part_of_the_key() {
        let cache = SeriesCache::new();
        let comma = LoadOptions::default();
        let semicolon = LoadOptions {
            delimiter: b';',
            ..comma
        };
        cache.load(b"time;value\n0;1\n", &semicolon).unwrap();
        assert!(cache.load(b"time;value\n0;1\n", &comma).is_err());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn size_ceiling_applies_to_cache_hits() {
        let cache = SeriesCache::new();
        let source = b"time,value\n0,1\n";
        let tight = LoadOptions {
            max_bytes: 8,
            ..LoadOptions::default()
        };
        assert!(matches!(
            cache.load(source, &tight),
            Err(LoadError::TooLarge { limit: 8 })
        ));
        cache.load(source, &LoadOptions::default()).unwrap();
        assert!(matches!(
            cache.load(source, &tight),
            Err(LoadError::TooLarge { limit: 8 })
        ));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = SeriesCache::new();
        assert!(cache.load(b"a,b\n1,2\n", &LoadOptions::default()).is_err());
        assert!(cache.is_empty());
    }
}
