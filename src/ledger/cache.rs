//! Bounded TTL cache for posting traces.
//!
//! Owned by the service instance — there is no module-level state. The
//! clock is injectable so tests can advance time without sleeping.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::InvoiceKind;
use crate::posting::InvoicePostingTrace;

/// How long a fetched trace stays fresh.
pub const DEFAULT_TRACE_TTL: Duration = Duration::from_secs(10 * 60);

/// Upper bound on cached traces; the oldest entry is evicted beyond it.
pub const DEFAULT_TRACE_CAPACITY: usize = 256;

/// Time source for TTL decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Cache key: one trace per invoice per company.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraceKey {
    pub company: String,
    pub kind: InvoiceKind,
    pub invoice_id: String,
}

struct CacheEntry {
    trace: InvoicePostingTrace,
    stored_at: Instant,
}

/// Bounded, TTL-expiring trace cache.
pub struct TraceCache {
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
    entries: HashMap<TraceKey, CacheEntry>,
}

impl TraceCache {
    pub fn new(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            capacity,
            clock,
            entries: HashMap::new(),
        }
    }

    /// A cache with the default TTL, capacity, and system clock.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_TRACE_TTL, DEFAULT_TRACE_CAPACITY, Arc::new(SystemClock))
    }

    /// A fresh trace for the key, or `None` when absent or expired.
    pub fn get(&self, key: &TraceKey) -> Option<&InvoicePostingTrace> {
        let entry = self.entries.get(key)?;
        if self.clock.now().duration_since(entry.stored_at) > self.ttl {
            return None;
        }
        Some(&entry.trace)
    }

    /// Store a trace, overwriting any previous entry for the key and
    /// evicting the oldest entry when full.
    pub fn insert(&mut self, key: TraceKey, trace: InvoicePostingTrace) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            if let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.stored_at)
                .map(|(k, _)| k.clone())
            {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(
            key,
            CacheEntry {
                trace,
                stored_at: self.clock.now(),
            },
        );
    }

    /// Drop the entry for a key, if any.
    pub fn remove(&mut self, key: &TraceKey) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
