pub mod memory_store;
pub mod redis_store;

use async_trait::async_trait;

use crate::error::CacheResult;

pub use self::memory_store::MemoryStore;
pub use self::redis_store::RedisStore;

/// Connection handle to a key-value store. Each call resolves exactly once.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Liveness flag at call time. Never blocks.
    fn is_alive(&self) -> bool;

    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()>;

    /// Absent keys are not an error.
    async fn del(&self, key: &str) -> CacheResult<()>;

    /// Releases the connection. Later calls fail with `CacheError::Closed`.
    fn close(&self);
}
