//! Shared rate cache with per-entry TTL (Time To Live) expiry.
//!
//! The cache is the only shared mutable state in the rate subsystem. It is
//! injected behind the [`Cache`] trait so tests can substitute a
//! deterministic double. Writes are idempotent recomputations of the same
//! logical quantity, so concurrent writers may race and any winner is an
//! equally valid recent value.

use crate::models::{ForexTable, Rate};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// A value held in the shared cache, one variant per logical quantity.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    /// Integer USD rate from one provider
    Rate(Rate),

    /// Complete forex conversion table
    Forex(ForexTable),

    /// Network fee estimate
    Fee(Decimal),
}

impl CacheValue {
    pub fn as_rate(&self) -> Option<Rate> {
        match self {
            CacheValue::Rate(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_forex(&self) -> Option<&ForexTable> {
        match self {
            CacheValue::Forex(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_fee(&self) -> Option<Decimal> {
        match self {
            CacheValue::Fee(f) => Some(*f),
            _ => None,
        }
    }
}

/// String-keyed store with per-entry expiry.
///
/// A read after expiry is a miss, never a stale hit. Implementations must
/// be safe for concurrent use from multiple request-handling threads.
pub trait Cache: Send + Sync {
    /// Get a value if it exists and has not expired.
    fn get(&self, key: &str) -> Option<CacheValue>;

    /// Store a value, replacing any existing entry under the same key.
    fn set(&self, key: &str, value: CacheValue, ttl: Duration);
}

/// An expiring entry.
#[derive(Debug, Clone)]
struct Entry {
    value: CacheValue,
    expires_at: Instant,
}

/// In-memory [`Cache`] implementation.
///
/// A plain expiring map: no eviction beyond TTL expiry, last write wins.
/// Cloning is cheap (shares the underlying map via `Arc`).
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all entries whose TTL has passed.
    ///
    /// Optional housekeeping; `get` already ignores expired entries.
    pub fn cleanup_expired(&self) {
        let now = Instant::now();

        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, entry| entry.expires_at > now);
        }
    }

    /// Number of entries, including expired ones not yet cleaned up.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<CacheValue> {
        let now = Instant::now();

        if let Ok(entries) = self.entries.read() {
            if let Some(entry) = entries.get(key) {
                if entry.expires_at > now {
                    return Some(entry.value.clone());
                }
            }
        }

        None
    }

    fn set(&self, key: &str, value: CacheValue, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };

        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), entry);
        }
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.len())
            .finish()
    }
}
