//! Copy-on-write registry snapshots for routes that change while serving.
//!
//! Readers load the current snapshot wait-free and match against it without
//! locking the registry. Writers clone the registry (entries are `Arc`-shared,
//! so this is shallow), mutate the clone and publish it atomically. Requests
//! already holding an older snapshot finish against it.
//!
//! Each snapshot carries its own match cache, so publishing a new snapshot is
//! also the cache invalidation.

use arc_swap::ArcSwap;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::core::MatchResult;
use super::registry::Registry;
use super::template::normalize_path;
use crate::error::RouteError;

type CacheKey = (String, String);

/// One published registry plus its read-through cache.
pub struct Snapshot<H> {
    registry: Registry<H>,
    cache: Option<Mutex<LruCache<CacheKey, MatchResult<H>>>>,
}

impl<H> Snapshot<H> {
    fn new(registry: Registry<H>, cache_capacity: usize) -> Self {
        let cache = NonZeroUsize::new(cache_capacity).map(|cap| Mutex::new(LruCache::new(cap)));
        Self { registry, cache }
    }

    /// The registry this snapshot was built from.
    #[must_use]
    pub fn registry(&self) -> &Registry<H> {
        &self.registry
    }

    /// Match through the cache, computing and storing on a miss.
    #[must_use]
    pub fn match_route(&self, method: &str, path: &str) -> MatchResult<H> {
        let Some(cache) = &self.cache else {
            return self.registry.match_route(method, path);
        };

        let key = (method.to_ascii_uppercase(), normalize_path(path));
        if let Ok(mut guard) = cache.lock() {
            if let Some(hit) = guard.get(&key) {
                debug!(method = %key.0, path = %key.1, "Route cache hit");
                return hit.clone();
            }
        }

        let result = self.registry.match_route(&key.0, &key.1);
        if let Ok(mut guard) = cache.lock() {
            guard.put(key, result.clone());
        }
        result
    }

    /// Number of cached lookups.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache
            .as_ref()
            .and_then(|c| c.lock().ok().map(|g| g.len()))
            .unwrap_or(0)
    }
}

/// A registry that can be swapped while requests are being matched.
///
/// ```rust
/// use pathwright::router::{Methods, Registry, SharedRegistry};
///
/// let mut registry: Registry<&str> = Registry::new();
/// registry.add_route("/health", "health", Methods::Any).unwrap();
/// let shared = SharedRegistry::new(registry, 128);
///
/// assert!(shared.match_route("GET", "/health").is_match());
///
/// shared
///     .update(|r| r.add_route("/ready", "ready", Methods::Any))
///     .unwrap();
/// assert!(shared.match_route("GET", "/ready").is_match());
/// ```
pub struct SharedRegistry<H> {
    current: ArcSwap<Snapshot<H>>,
    cache_capacity: usize,
}

impl<H> SharedRegistry<H> {
    /// Publish `registry` as the first snapshot. A `cache_capacity` of `0`
    /// disables the match cache.
    #[must_use]
    pub fn new(registry: Registry<H>, cache_capacity: usize) -> Self {
        Self {
            current: ArcSwap::from_pointee(Snapshot::new(registry, cache_capacity)),
            cache_capacity,
        }
    }

    /// Load the current snapshot. Hold on to it to run several lookups
    /// against one consistent routing table.
    #[must_use]
    pub fn load(&self) -> Arc<Snapshot<H>> {
        self.current.load_full()
    }

    /// Match against the current snapshot.
    #[must_use]
    pub fn match_route(&self, method: &str, path: &str) -> MatchResult<H> {
        self.current.load().match_route(method, path)
    }

    /// Replace the routing table wholesale.
    pub fn store(&self, registry: Registry<H>) {
        info!(routes_count = registry.len(), "Publishing routing table snapshot");
        self.current
            .store(Arc::new(Snapshot::new(registry, self.cache_capacity)));
    }

    /// Apply `mutate` to a copy of the current registry and publish it.
    ///
    /// Nothing is published if `mutate` fails. Concurrent writers are not
    /// merged: the last `update` to publish wins, so callers should
    /// serialize writes.
    ///
    /// # Errors
    ///
    /// Whatever `mutate` returns.
    pub fn update<F>(&self, mutate: F) -> Result<(), RouteError>
    where
        F: FnOnce(&mut Registry<H>) -> Result<(), RouteError>,
    {
        let mut next = self.current.load().registry().clone();
        mutate(&mut next)?;
        self.store(next);
        Ok(())
    }
}
