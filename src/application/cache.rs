//! Read-through/invalidate-on-write helpers shared by the cached services.
//!
//! Cache trouble must never fail the caller's request: every error from the
//! cache port is logged and treated as a miss (reads) or a no-op (writes and
//! evictions). The worst case is a stale entry until its TTL runs out.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::ports::EntityCache;

pub(crate) fn cache_read<T: DeserializeOwned>(cache: &impl EntityCache, key: &str) -> Option<T> {
    match cache.get(key) {
        Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("discarding undecodable cache entry {}: {}", key, e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            log::warn!("cache read for {} failed, falling back to store: {}", key, e);
            None
        }
    }
}

pub(crate) fn cache_write<T: Serialize>(
    cache: &impl EntityCache,
    key: &str,
    value: &T,
    ttl: Duration,
) {
    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("failed to serialize cache entry {}: {}", key, e);
            return;
        }
    };
    if let Err(e) = cache.set(key, &bytes, ttl) {
        log::warn!("cache write for {} failed: {}", key, e);
    }
}

pub(crate) fn cache_evict(cache: &impl EntityCache, key: &str) {
    if let Err(e) = cache.delete(key) {
        log::warn!("cache eviction for {} failed, entry may be stale: {}", key, e);
    }
}
