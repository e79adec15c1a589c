//! Single-slot, time-based response cache.
//!
//! One entry at most. `get_cached` evicts once `now > expires_at`; the stale
//! flag is measured from `cached_at` against a separate threshold and is
//! purely diagnostic.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use subwatch_types::{Clock, SubscriberBundle};

/// A cached payload with its timestamps (ms since the Unix epoch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntry<T> {
    pub payload: T,
    pub cached_at: u64,
    pub expires_at: u64,
}

/// Diagnostic view of the slot; computing it never evicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    pub has_cached_data: bool,
    pub is_expired: bool,
    pub is_stale: bool,
    /// Milliseconds until expiry; `None` when the slot is empty.
    pub remaining_time: Option<u64>,
}

pub struct ResponseCache<T> {
    slot: Mutex<Option<CacheEntry<T>>>,
    ttl: Duration,
    stale_after: Duration,
    clock: Arc<dyn Clock>,
}

/// The cache behind `/api/twitch/subscribers`.
pub type SubscriberCache = ResponseCache<SubscriberBundle>;

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl<T: Clone> ResponseCache<T> {
    #[must_use]
    pub fn new(ttl: Duration, stale_after: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
            stale_after,
            clock,
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    #[must_use]
    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Returns the live entry, evicting it if it has expired.
    pub fn get_cached(&self) -> Option<CacheEntry<T>> {
        let now = self.now_ms();
        let mut slot = self.lock();
        if slot.as_ref().is_some_and(|e| now > e.expires_at) {
            tracing::debug!("subscriber cache entry expired, evicting");
            *slot = None;
        }
        slot.clone()
    }

    /// Returns whatever is in the slot, expired or not, without evicting.
    #[must_use]
    pub fn peek(&self) -> Option<CacheEntry<T>> {
        self.lock().clone()
    }

    /// Replaces the slot and returns the new entry.
    pub fn set_cached(&self, payload: T) -> CacheEntry<T> {
        let now = self.now_ms();
        let entry = CacheEntry {
            payload,
            cached_at: now,
            expires_at: now.saturating_add(millis(self.ttl)),
        };
        *self.lock() = Some(entry.clone());
        entry
    }

    #[must_use]
    pub fn is_stale(&self, entry: &CacheEntry<T>) -> bool {
        self.now_ms().saturating_sub(entry.cached_at) > millis(self.stale_after)
    }

    #[must_use]
    pub fn cache_info(&self) -> CacheInfo {
        let now = self.now_ms();
        match self.lock().as_ref() {
            None => CacheInfo {
                has_cached_data: false,
                is_expired: true,
                is_stale: true,
                remaining_time: None,
            },
            Some(entry) => CacheInfo {
                has_cached_data: true,
                is_expired: now > entry.expires_at,
                is_stale: now.saturating_sub(entry.cached_at) > millis(self.stale_after),
                remaining_time: Some(entry.expires_at.saturating_sub(now)),
            },
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<CacheEntry<T>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
