//! Compiled-definition cache.
//!
//! Each distinct definition string is compiled at most once, even when
//! many threads ask for it at the same time: the map holds one
//! [`OnceCell`] per definition and every caller initializes through it.

use contour_core::{DefinitionError, TypeExpression};
use once_cell::sync::{Lazy, OnceCell};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Result of compiling one definition
pub type Compiled = Result<Arc<TypeExpression>, DefinitionError>;

type Slot = Arc<OnceCell<Compiled>>;

static GLOBAL: Lazy<DefinitionCache> = Lazy::new(DefinitionCache::new);

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of retained definitions (0 = unlimited)
    pub max_entries: usize,
    /// Retain failed compilations as well as successful ones
    pub cache_errors: bool,
}

impl CacheConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_entries: 4096,
            cache_errors: true,
        }
    }

    /// Set the entry limit
    #[must_use]
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Set whether failures are retained
    #[must_use]
    pub fn with_cache_errors(mut self, cache_errors: bool) -> Self {
        self.cache_errors = cache_errors;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that compiled
    pub misses: u64,
    /// Retained definitions
    pub entries: usize,
}

/// Cache of compiled definitions keyed by definition text
pub struct DefinitionCache {
    config: CacheConfig,
    entries: RwLock<HashMap<String, Slot>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DefinitionCache {
    /// Create a cache with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Create with custom configuration
    #[must_use]
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Process-wide cache
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Compiled form of `definition`, compiling it on first use
    ///
    /// # Errors
    ///
    /// Returns the compilation error for a malformed definition
    pub fn get_or_compile(&self, definition: &str) -> Compiled {
        let existing = self.read_entries().get(definition).cloned();
        let slot = match existing {
            Some(slot) => slot,
            None => match self.reserve(definition) {
                Some(slot) => slot,
                None => {
                    // Full: compile without retaining
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(definition, "cache full, compiling uncached");
                    return compile(definition);
                }
            },
        };

        let mut compiled_here = false;
        let result = slot
            .get_or_init(|| {
                compiled_here = true;
                tracing::debug!(definition, "compiling definition");
                compile(definition)
            })
            .clone();

        if compiled_here {
            self.misses.fetch_add(1, Ordering::Relaxed);
            if result.is_err() && !self.config.cache_errors {
                self.evict(definition, &slot);
            }
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(definition, "definition cache hit");
        }
        result
    }

    /// Cached result for `definition`, if it has been compiled
    #[must_use]
    pub fn get(&self, definition: &str) -> Option<Compiled> {
        self.read_entries()
            .get(definition)
            .and_then(|slot| slot.get().cloned())
    }

    /// Whether `definition` is retained
    #[must_use]
    pub fn contains(&self, definition: &str) -> bool {
        self.read_entries().contains_key(definition)
    }

    /// Number of retained definitions
    #[must_use]
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    /// Check if nothing is retained
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every retained definition; statistics are kept
    pub fn clear(&self) {
        self.write_entries().clear();
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    /// Slot for a new definition, or `None` when the cache is full
    fn reserve(&self, definition: &str) -> Option<Slot> {
        let mut entries = self.write_entries();
        if let Some(slot) = entries.get(definition) {
            return Some(Arc::clone(slot));
        }
        if self.config.max_entries > 0 && entries.len() >= self.config.max_entries {
            return None;
        }
        let slot = Slot::default();
        entries.insert(definition.to_string(), Arc::clone(&slot));
        Some(slot)
    }

    fn evict(&self, definition: &str, slot: &Slot) {
        let mut entries = self.write_entries();
        if entries
            .get(definition)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
        {
            entries.remove(definition);
        }
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<String, Slot>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            tracing::warn!("definition cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<String, Slot>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            tracing::warn!("definition cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl Default for DefinitionCache {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(definition: &str) -> Compiled {
    contour_lang::parse(definition).map(Arc::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::thread;

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.max_entries, 4096);
        assert!(config.cache_errors);
    }

    #[test]
    fn test_cache_new() {
        let cache = DefinitionCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_compile_once() {
        let cache = DefinitionCache::new();
        let first = cache.get_or_compile("Array<Integer>").unwrap();
        let second = cache.get_or_compile("Array<Integer>").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_get() {
        let cache = DefinitionCache::new();
        assert!(cache.get("String").is_none());
        cache.get_or_compile("String").unwrap();
        assert_eq!(cache.get("String").unwrap().unwrap().to_string(), "String");
        assert!(cache.contains("String"));
    }

    #[test]
    fn test_errors_cached() {
        let cache = DefinitionCache::new();
        assert!(cache.get_or_compile("Array<").is_err());
        assert!(cache.get_or_compile("Array<").is_err());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_errors_not_cached() {
        let cache = DefinitionCache::with_config(CacheConfig::new().with_cache_errors(false));
        assert!(cache.get_or_compile("Array<").is_err());
        assert!(cache.is_empty());
        assert!(cache.get_or_compile("Array<").is_err());
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_max_entries() {
        let cache = DefinitionCache::with_config(CacheConfig::new().with_max_entries(2));
        cache.get_or_compile("String").unwrap();
        cache.get_or_compile("Integer").unwrap();
        let uncached = cache.get_or_compile("Float").unwrap();
        assert_eq!(uncached.to_string(), "Float");
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("Float"));

        // Retained entries still hit
        cache.get_or_compile("String").unwrap();
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_clear() {
        let cache = DefinitionCache::new();
        cache.get_or_compile("String").unwrap();
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_concurrent_single_compile() {
        let cache = Arc::new(DefinitionCache::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.get_or_compile("Hash<Symbol,String(min: 3)>").unwrap())
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        for result in &results[1..] {
            assert!(Arc::ptr_eq(&results[0], result));
        }
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 7);
    }

    #[test]
    fn test_global_is_shared() {
        let a = DefinitionCache::global();
        let b = DefinitionCache::global();
        assert!(std::ptr::eq(a, b));
        assert!(a.get_or_compile("Symbol").is_ok());
    }

    #[test]
    fn test_stats_serialize() {
        let cache = DefinitionCache::new();
        cache.get_or_compile("Integer").unwrap();
        let json = serde_json::to_value(cache.stats()).unwrap();
        assert_eq!(json, serde_json::json!({"hits": 0, "misses": 1, "entries": 1}));

        let config: CacheConfig =
            serde_json::from_str(r#"{"max_entries": 8, "cache_errors": false}"#).unwrap();
        assert_eq!(config, CacheConfig::new().with_max_entries(8).with_cache_errors(false));
    }

    proptest! {
        #[test]
        fn prop_cached_result_matches_direct_parse(definition in "[A-Za-z<>,|:#()?\\- 0-9]{0,16}") {
            let cache = DefinitionCache::new();
            let direct = contour_lang::parse(&definition);
            let first = cache.get_or_compile(&definition);
            let second = cache.get_or_compile(&definition);

            prop_assert_eq!(first.clone().map(|e| (*e).clone()), direct);
            prop_assert_eq!(first, second);
            prop_assert_eq!(cache.stats().misses, 1);
        }
    }
}
