use std::{fmt, future::Future, sync::Arc};

use tracing::info;

use crate::{
    config::{Backend, CacheClientConfig},
    error::CacheResult,
    store::{KvStore, MemoryStore, RedisStore},
};

/// Blocking-style accessor over one shared store connection.
///
/// Clones share the same connection. Nothing here retries, times out or
/// translates errors: whatever the store reports reaches the caller whose
/// call was in flight.
#[derive(Clone)]
pub struct CacheClient {
    store: Arc<dyn KvStore>,
}

impl fmt::Debug for CacheClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheClient")
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl CacheClient {
    /// Builds the configured backend without waiting for it to connect.
    pub fn open(cfg: &CacheClientConfig) -> CacheResult<Self> {
        let store: Arc<dyn KvStore> = match cfg.backend {
            Backend::Redis => Arc::new(RedisStore::connect(cfg)?),
            Backend::Memory => Arc::new(MemoryStore::new()),
        };
        info!(backend = %cfg.backend, "cache client opened");

        Ok(Self::with_store(store))
    }

    pub fn with_store(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Opens a client, hands it to `f` and closes it once `f` finishes,
    /// fails, panics or is dropped.
    pub async fn scoped<F, Fut, T>(cfg: &CacheClientConfig, f: F) -> CacheResult<T>
    where
        F: FnOnce(CacheClient) -> Fut,
        Fut: Future<Output = CacheResult<T>>,
    {
        let client = Self::open(cfg)?;
        let _guard = CloseOnDrop(client.clone());
        f(client).await
    }

    pub fn is_alive(&self) -> bool {
        self.store.is_alive()
    }

    /// `Ok(None)` when the key does not exist.
    pub async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.store.get(key).await
    }

    /// Stores `value` under `key`, expiring after `ttl_secs` seconds.
    pub async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        self.store.set_ex(key, value, ttl_secs).await
    }

    pub async fn del(&self, key: &str) -> CacheResult<()> {
        self.store.del(key).await
    }

    /// Releases the shared connection for every clone of this client.
    pub fn close(&self) {
        self.store.close();
        info!("cache client closed");
    }
}

struct CloseOnDrop(CacheClient);

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        self.0.close();
    }
}
