use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use app_core::clock::{AppClock, AppTime, Clock};
use async_trait::async_trait;
use dashmap::DashMap;

use crate::{
    error::{CacheError, CacheResult},
    store::KvStore,
};

struct MemoryEntry {
    value: String,
    expires_at: AppTime,
}

/// How often, in clock time, a write sweeps out expired entries nobody read.
const SWEEP_EVERY: Duration = Duration::from_secs(1);

/// In-process store with redis-like semantics. Expired entries are dropped
/// when read, and writes sweep the whole map at most once per `SWEEP_EVERY`.
pub struct MemoryStore {
    entries: DashMap<String, MemoryEntry>,
    clock: Arc<dyn Clock>,
    open: AtomicBool,
    next_sweep_ms: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(AppClock::new()))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let first_sweep = clock.now_millis().plus(SWEEP_EVERY);
        Self {
            entries: DashMap::new(),
            clock,
            open: AtomicBool::new(true),
            next_sweep_ms: AtomicU64::new(first_sweep.as_millis_u64()),
        }
    }

    /// Drops every entry whose expiry has passed. Returns how many went.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let before = self.entries.len();
        self.entries.retain(|_, e| now.is_before(&e.expires_at));
        before.saturating_sub(self.entries.len())
    }

    fn maybe_sweep(&self, now: AppTime) {
        let due = self.next_sweep_ms.load(Ordering::Acquire);
        if now.as_millis_u64() < due {
            return;
        }

        // Only the writer that moves the deadline sweeps.
        let next = now.plus(SWEEP_EVERY).as_millis_u64();
        if self
            .next_sweep_ms
            .compare_exchange(due, next, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.purge_expired();
        }
    }

    /// Entries currently held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ensure_open(&self) -> CacheResult<()> {
        if self.open.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(CacheError::Closed)
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    fn is_alive(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.ensure_open()?;
        let now = self.clock.now_millis();

        let expired = match self.entries.get(key) {
            Some(entry) if now.is_before(&entry.expires_at) => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries
                .remove_if(key, |_, e| e.expires_at.is_before_or_eq(&now));
        }

        Ok(None)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        self.ensure_open()?;

        // Same refusal redis gives for `SET k v EX 0`.
        if ttl_secs == 0 {
            return Err(CacheError::Rejected(
                "invalid expire time in 'set' command".into(),
            ));
        }

        let now = self.clock.now_millis();
        self.maybe_sweep(now);

        let expires_at = now.plus(Duration::from_secs(ttl_secs));
        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at,
            },
        );

        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        self.ensure_open()?;
        self.entries.remove(key);
        Ok(())
    }

    fn close(&self) {
        self.open.store(false, Ordering::Release);
        self.entries.clear();
    }
}
