use std::{env, time::Duration};

use app_cache::{Backend, CacheClientConfig};

use crate::errors::AppError;

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub port: u16,
    pub cache: CacheClientConfig,
}

impl ApiConfig {
    /// Reads `PORT`, `CACHE_BACKEND`, `REDIS_URL`, `REDIS_CONNECT_TIMEOUT_MS` and
    /// `REDIS_HEALTH_CHECK_MS`.
    /// Unset values keep their defaults.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut cfg = Self::default();

        if let Some(port) = lookup("PORT") {
            cfg.port = port
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("PORT '{port}' is not a valid port")))?;
        }

        if let Some(backend) = lookup("CACHE_BACKEND") {
            cfg.cache.backend = backend.parse::<Backend>()?;
        }

        if let Some(url) = lookup("REDIS_URL").filter(|s| !s.trim().is_empty()) {
            cfg.cache.redis_url = url.trim().to_string();
        }

        if let Some(ms) = lookup("REDIS_CONNECT_TIMEOUT_MS") {
            let ms: u64 = ms.trim().parse().map_err(|_| {
                AppError::Config(format!("REDIS_CONNECT_TIMEOUT_MS '{ms}' is not a number"))
            })?;
            cfg.cache.connect_timeout = Duration::from_millis(ms);
        }

        if let Some(ms) = lookup("REDIS_HEALTH_CHECK_MS") {
            let ms: u64 = ms.trim().parse().map_err(|_| {
                AppError::Config(format!("REDIS_HEALTH_CHECK_MS '{ms}' is not a number"))
            })?;
            cfg.cache.health_check_interval = Duration::from_millis(ms);
        }

        Ok(cfg)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            cache: CacheClientConfig::default(),
        }
    }
}
