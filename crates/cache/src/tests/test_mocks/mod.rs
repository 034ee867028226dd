pub mod fake_redis;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    error::{CacheError, CacheResult},
    store::KvStore,
};

pub use self::fake_redis::FakeRedis;

/// Store that records every call and answers from canned values.
pub struct MockStore {
    pub alive: AtomicBool,
    pub failing: AtomicBool,
    pub closed: AtomicUsize,
    pub get_result: Mutex<Option<String>>,

    pub calls: Mutex<Vec<String>>,
    pub last_set: Mutex<Option<(String, String, u64)>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            alive: AtomicBool::new(true),
            failing: AtomicBool::new(false),
            closed: AtomicUsize::new(0),
            get_result: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            last_set: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        let store = Self::new();
        store.failing.store(true, Ordering::SeqCst);
        store.alive.store(false, Ordering::SeqCst);
        store
    }

    pub fn with_value(value: &str) -> Self {
        let store = Self::new();
        *store.get_result.lock() = Some(value.to_string());
        store
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn record(&self, call: String) -> CacheResult<()> {
        self.calls.lock().push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::Connection("connection reset by peer".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl KvStore for MockStore {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.record(format!("GET {key}"))?;
        Ok(self.get_result.lock().clone())
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        self.record(format!("SET {key} {value} EX {ttl_secs}"))?;
        *self.last_set.lock() = Some((key.to_string(), value.to_string(), ttl_secs));
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        self.record(format!("DEL {key}"))
    }

    fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
        self.alive.store(false, Ordering::SeqCst);
    }
}
