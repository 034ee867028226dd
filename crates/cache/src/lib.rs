pub mod client;
pub mod config;
pub mod error;
pub mod store;

#[cfg(test)]
mod tests;

pub use client::CacheClient;
pub use config::{Backend, CacheClientConfig, DEFAULT_REDIS_URL};
pub use error::{CacheError, CacheResult};
pub use store::{KvStore, MemoryStore, RedisStore};
