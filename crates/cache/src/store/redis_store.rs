use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use redis::{AsyncCommands, Client, RedisError, RedisResult, aio::MultiplexedConnection};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, error, info};

use app_core::utils::generate_short_id;

use crate::{
    config::CacheClientConfig,
    error::{CacheError, CacheResult},
    store::KvStore,
};

#[derive(Clone)]
enum Link {
    Connecting,
    Ready(MultiplexedConnection),
    Failed(Arc<str>),
    Closed,
}

/// Single multiplexed connection to a redis server.
///
/// Construction only starts the connect attempt. Calls issued while it is
/// still pending wait for it to resolve. Once connected, the same task pings
/// the server every `health_check_interval` so an idle connection dropped by
/// the server clears the liveness flag without any caller involved. A failed
/// or dropped connection is never re-established; the caller decides whether
/// to build a new store.
pub struct RedisStore {
    id: Arc<str>,
    link: Arc<watch::Sender<Link>>,
    /// Set to `true` only while the `link` lock is held, so a `Closed` link is never
    /// reported alive. Any path may clear it.
    alive: Arc<AtomicBool>,
    connector: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl RedisStore {
    /// Parses the url and spawns the connection task. Must run inside a tokio runtime.
    pub fn connect(cfg: &CacheClientConfig) -> CacheResult<Self> {
        let client = Client::open(cfg.redis_url.as_str())
            .map_err(|e| CacheError::Config(format!("invalid redis url: {e}")))?;

        let id = Arc::<str>::from(generate_short_id(8));
        let (tx, _) = watch::channel(Link::Connecting);
        let link = Arc::new(tx);
        let alive = Arc::new(AtomicBool::new(false));

        let connector = tokio::spawn(run_connection(
            client,
            cfg.connect_timeout,
            cfg.health_check_interval,
            id.clone(),
            link.clone(),
            alive.clone(),
        ));

        Ok(Self {
            id,
            link,
            alive,
            connector: Mutex::new(Some(connector)),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    async fn connection(&self) -> CacheResult<MultiplexedConnection> {
        let mut rx = self.link.subscribe();
        let link = rx
            .wait_for(|l| !matches!(l, Link::Connecting))
            .await
            .map_err(|_| CacheError::Closed)?;

        match &*link {
            Link::Ready(conn) => Ok(conn.clone()),
            Link::Failed(reason) => Err(CacheError::Connection(reason.to_string())),
            Link::Connecting | Link::Closed => Err(CacheError::Closed),
        }
    }

    /// Hands the error back untouched for the caller in flight, after the
    /// connection-level observer has seen it.
    fn observe(&self, err: RedisError) -> CacheError {
        if is_link_failure(&err) {
            report_link_lost(&self.id, &self.alive, &err);
        }
        CacheError::Transport(err)
    }
}

fn is_link_failure(err: &RedisError) -> bool {
    err.is_io_error()
        || err.is_connection_dropped()
        || err.is_connection_refusal()
}

/// Passive observer: logs and clears the liveness flag. Never closes or retries.
fn report_link_lost(id: &str, alive: &AtomicBool, err: &RedisError) {
    alive.store(false, Ordering::Release);
    error!(store = %id, error = %err, "redis transport error");
}

async fn run_connection(
    client: Client,
    connect_timeout: Duration,
    health_check_interval: Duration,
    id: Arc<str>,
    link: Arc<watch::Sender<Link>>,
    alive: Arc<AtomicBool>,
) {
    let Some(conn) = establish(client, connect_timeout, &id, &link, &alive).await else {
        return;
    };

    if !health_check_interval.is_zero() {
        watch_connection(conn, health_check_interval, &id, &alive).await;
    }
}

/// Pings until the first connection-level failure. Server-side errors keep it going.
async fn watch_connection(
    mut conn: MultiplexedConnection,
    every: Duration,
    id: &str,
    alive: &AtomicBool,
) {
    let mut ticker = time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let pong: RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        match pong {
            Ok(_) => {}
            Err(e) if is_link_failure(&e) => {
                report_link_lost(id, alive, &e);
                return;
            }
            Err(e) => debug!(store = %id, error = %e, "health check answered with an error"),
        }
    }
}

/// Resolves the single connect attempt. Returns the connection only if it was installed.
async fn establish(
    client: Client,
    connect_timeout: Duration,
    id: &str,
    link: &watch::Sender<Link>,
    alive: &AtomicBool,
) -> Option<MultiplexedConnection> {
    let attempt =
        tokio::time::timeout(connect_timeout, client.get_multiplexed_async_connection()).await;

    let outcome = match attempt {
        Ok(Ok(conn)) => Link::Ready(conn),
        Ok(Err(e)) => {
            error!(store = %id, error = %e, "redis connect attempt failed");
            Link::Failed(Arc::from(e.to_string()))
        }
        Err(_) => {
            error!(store = %id, ?connect_timeout, "redis connect attempt timed out");
            Link::Failed(Arc::from(format!(
                "connect timeout after {connect_timeout:?}"
            )))
        }
    };

    let conn = match &outcome {
        Link::Ready(conn) => Some(conn.clone()),
        _ => None,
    };
    let ready = conn.is_some();

    // A concurrent close wins over a late handshake.
    let applied = link.send_if_modified(|current| {
        if !matches!(current, Link::Connecting) {
            return false;
        }
        alive.store(ready, Ordering::Release);
        *current = outcome;
        true
    });

    if !applied {
        return None;
    }
    if ready {
        info!(store = %id, "redis connection ready");
    }
    conn
}

#[async_trait]
impl KvStore for RedisStore {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection().await?;
        debug!(store = %self.id, key, "GET");

        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| self.observe(e))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        debug!(store = %self.id, key, ttl_secs, "SET EX");

        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e| self.observe(e))
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        debug!(store = %self.id, key, "DEL");

        conn.del::<_, ()>(key).await.map_err(|e| self.observe(e))
    }

    fn close(&self) {
        if let Some(h) = self.connector.lock().take() {
            h.abort();
        }

        let alive = &self.alive;
        self.link.send_modify(|current| {
            alive.store(false, Ordering::Release);
            *current = Link::Closed;
        });
        debug!(store = %self.id, "redis connection closed");
    }
}

impl Drop for RedisStore {
    fn drop(&mut self) {
        if let Some(h) = self.connector.get_mut().take() {
            h.abort();
        }
    }
}
