//! Advisory tag value suggestions.
//!
//! Suggestions combine option codes from the field catalog with values
//! reported by an optional remote [`KnownValuesSource`]. The remote source is
//! advisory: when it is unavailable suggestions fall back to the catalog and
//! matching or search are unaffected.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, PoisonError, RwLock};

use log::debug;
use presetdb_core::CatalogSnapshot;
use thiserror::Error;

/// The remote value source could not answer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("known values unavailable: {reason}")]
pub struct LookupUnavailable {
    /// Human-readable cause.
    pub reason: String,
}

impl LookupUnavailable {
    /// Create an error with the given cause.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Reports values commonly used with a tag key.
pub trait KnownValuesSource: Send + Sync {
    /// Look up values in use for `key`.
    ///
    /// # Errors
    /// Returns [`LookupUnavailable`] when the source cannot be reached.
    fn lookup_known_values(&self, key: &str) -> Result<Vec<String>, LookupUnavailable>;
}

/// Number of tag keys remembered by [`TagValueCache::new`].
pub const DEFAULT_CACHED_KEYS: usize = 1024;

/// Memoises successful lookups against a [`KnownValuesSource`].
///
/// Failed lookups are not cached and are retried on the next request. At
/// most `capacity` keys are held; inserting past it evicts the
/// lexicographically first key.
pub struct TagValueCache {
    source: Arc<dyn KnownValuesSource>,
    capacity: usize,
    entries: RwLock<BTreeMap<String, Arc<[String]>>>,
}

impl std::fmt::Debug for TagValueCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("TagValueCache")
            .field("cached_keys", &cached)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl TagValueCache {
    /// Wrap `source` with an empty cache of [`DEFAULT_CACHED_KEYS`] keys.
    pub fn new(source: Arc<dyn KnownValuesSource>) -> Self {
        Self::with_capacity(source, DEFAULT_CACHED_KEYS)
    }

    /// Wrap `source` with an empty cache holding at most `capacity` keys.
    ///
    /// A capacity of zero disables caching.
    pub fn with_capacity(source: Arc<dyn KnownValuesSource>, capacity: usize) -> Self {
        Self {
            source,
            capacity,
            entries: RwLock::default(),
        }
    }

    /// Values known for `key`; empty when the source is unavailable.
    pub fn values(&self, key: &str) -> Arc<[String]> {
        let cached = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();
        if let Some(values) = cached {
            return values;
        }
        match self.source.lookup_known_values(key) {
            Ok(values) => {
                let values: Arc<[String]> = values.into();
                if self.capacity > 0 {
                    let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
                    if entries.len() >= self.capacity && !entries.contains_key(key) {
                        entries.pop_first();
                    }
                    entries.insert(key.to_owned(), Arc::clone(&values));
                }
                values
            }
            Err(err) => {
                debug!("no remote values for `{key}`: {err}");
                Arc::from(Vec::new())
            }
        }
    }
}

/// Suggest values for `key` starting with `prefix`, case-insensitively.
///
/// Option codes of catalog fields editing `key` come first, in catalog
/// order, followed by remote values. Duplicates are removed.
pub fn suggest_values(
    snapshot: &CatalogSnapshot,
    cache: Option<&TagValueCache>,
    key: &str,
    prefix: &str,
) -> Vec<String> {
    let prefix = prefix.to_lowercase();
    let remote = cache.map(|cache| cache.values(key));
    let catalog = snapshot
        .fields()
        .values()
        .filter(|field| field.key == key || field.keys.iter().any(|other| other == key))
        .flat_map(|field| field.options.iter());
    let mut seen = BTreeSet::new();
    catalog
        .chain(remote.iter().flat_map(|values| values.iter()))
        .filter(|value| value.to_lowercase().starts_with(&prefix))
        .filter(|value| seen.insert(value.as_str()))
        .cloned()
        .collect()
}
