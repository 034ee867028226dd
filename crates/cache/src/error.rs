use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Transport error: {0}")]
    Transport(#[from] redis::RedisError),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Store rejected command: {0}")]
    Rejected(String),

    #[error("Cache client closed")]
    Closed,

    #[error("Config error: {0}")]
    Config(String),
}

pub type CacheResult<T> = Result<T, CacheError>;
