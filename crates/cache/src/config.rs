use std::{fmt, str::FromStr, time::Duration};

use crate::error::CacheError;

/// Where the redis client looks when nothing else is configured.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    #[default]
    Redis,
    /// In-process store, nothing leaves the process.
    Memory,
}

impl FromStr for Backend {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Backend::Redis),
            "memory" => Ok(Backend::Memory),
            other => Err(CacheError::Config(format!("unknown cache backend '{other}'"))),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Redis => f.write_str("redis"),
            Backend::Memory => f.write_str("memory"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CacheClientConfig {
    pub backend: Backend,
    pub redis_url: String,
    /// Bounds the initial connect attempt only. Requests are never timed out here.
    pub connect_timeout: Duration,
    /// How often an idle redis connection is pinged to notice drops. Zero disables it.
    pub health_check_interval: Duration,
}

impl CacheClientConfig {
    pub fn memory() -> Self {
        Self {
            backend: Backend::Memory,
            ..Self::default()
        }
    }

    pub fn with_redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = url.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_health_check_interval(mut self, every: Duration) -> Self {
        self.health_check_interval = every;
        self
    }
}

impl Default for CacheClientConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Redis,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            connect_timeout: Duration::from_secs(5),
            health_check_interval: Duration::from_secs(1),
        }
    }
}
