//! Caching of compiled filters keyed by their source expression.
//!
//! The cache is an explicit object owned by the caller; `compile` uses
//! one lazily-created process-wide instance by default, and
//! `compile_cached` accepts any other. There is no automatic eviction:
//! entries accumulate until `clear` is called, which is a deliberate,
//! caller-visible policy rather than a hidden LRU.

use crate::codegen::Filter;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock};

static GLOBAL: OnceLock<CompileCache> = OnceLock::new();

/// A thread-safe expression-to-filter cache.
#[derive(Debug, Default)]
pub struct CompileCache {
    entries: Mutex<HashMap<String, Filter>>,
    disabled: AtomicBool,
}

impl CompileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by `compile` when caching is on.
    pub fn global() -> &'static CompileCache {
        GLOBAL.get_or_init(CompileCache::new)
    }

    /// No critical section leaves the map half-written, so a lock
    /// poisoned by a panicking thread is still safe to reuse.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, Filter>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up a previously compiled filter. Always misses while the
    /// cache is disabled.
    pub fn get(&self, expression: &str) -> Option<Filter> {
        if !self.is_enabled() {
            return None;
        }
        self.entries().get(expression).cloned()
    }

    pub fn insert(&self, expression: &str, filter: Filter) {
        if !self.is_enabled() {
            return;
        }
        self.entries().insert(expression.to_string(), filter);
    }

    /// Drop every cached filter.
    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Turn the cache on or off without dropping its entries.
    pub fn set_enabled(&self, enabled: bool) {
        self.disabled.store(!enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled.load(Ordering::Relaxed)
    }
}
