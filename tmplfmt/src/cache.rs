use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use indexmap::IndexMap;

use crate::ast::ParseTree;
use crate::defaults::DEFAULT_CACHE_CAPACITY;
use crate::error::Error;
use crate::parser::parse_template;

/// A bounded cache from template source to parse tree.
///
/// Entries are evicted in insertion order once the cache is full.  Looking
/// up an entry does not refresh its position.  Templates that fail to parse
/// are never stored.  A capacity of zero disables caching.
///
/// The cache can be shared between threads.  Parsing happens outside of
/// the lock.
pub struct TemplateCache {
    capacity: usize,
    entries: Mutex<IndexMap<Arc<str>, Arc<ParseTree>>>,
}

impl Default for TemplateCache {
    fn default() -> TemplateCache {
        TemplateCache::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl fmt::Debug for TemplateCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateCache")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

impl TemplateCache {
    /// Creates an empty cache that holds up to `capacity` trees.
    pub fn new(capacity: usize) -> TemplateCache {
        TemplateCache {
            capacity,
            entries: Mutex::new(IndexMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<Arc<str>, Arc<ParseTree>>> {
        // the map is consistent after every operation, a poisoned lock is
        // still safe to use
        self.entries.lock().unwrap_or_else(|err| err.into_inner())
    }

    /// Returns the parse tree for a template, parsing it on a miss.
    pub fn get_or_parse(&self, source: &str) -> Result<Arc<ParseTree>, Error> {
        if let Some(tree) = self.lock().get(source) {
            trace!(len = source.len(), "template cache hit");
            return Ok(tree.clone());
        }

        trace!(len = source.len(), "template cache miss");
        let tree = Arc::new(ok!(parse_template(source)));
        if self.capacity == 0 {
            return Ok(tree);
        }

        let mut entries = self.lock();
        // another thread may have parsed the same template in the meantime
        if let Some(existing) = entries.get(source) {
            return Ok(existing.clone());
        }
        while entries.len() >= self.capacity {
            entries.shift_remove_index(0);
            debug!(capacity = self.capacity, "evicted oldest template from cache");
        }
        entries.insert(Arc::from(source), tree.clone());
        Ok(tree)
    }

    /// Returns the maximum number of cached trees.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of cached trees.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the template is cached.
    pub fn contains(&self, source: &str) -> bool {
        self.lock().contains_key(source)
    }

    /// Removes all cached trees.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_eviction() {
        let cache = TemplateCache::new(2);
        cache.get_or_parse("a").unwrap();
        cache.get_or_parse("b").unwrap();
        // a hit does not move "a" to the back
        cache.get_or_parse("a").unwrap();
        cache.get_or_parse("c").unwrap();
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_hit_returns_same_tree() {
        let cache = TemplateCache::default();
        let a = cache.get_or_parse("{x}").unwrap();
        let b = cache.get_or_parse("{x}").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_errors_not_cached() {
        let cache = TemplateCache::new(10);
        assert!(cache.get_or_parse("{broken").is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity() {
        let cache = TemplateCache::new(0);
        cache.get_or_parse("x").unwrap();
        assert!(cache.is_empty());
    }
}
