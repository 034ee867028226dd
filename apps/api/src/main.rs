use std::net::SocketAddr;

use app_cache::CacheClient;
use axum::{
    Router,
    routing::{get, put},
};
use dotenvy::{dotenv, from_filename};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::ApiConfig,
    errors::AppError,
    http::{AppState, delete_kv, get_kv, put_kv, status},
};

pub mod config;
pub mod errors;
pub mod http;

fn load_env_for_workspace() {
    let _ = from_filename(concat!(env!("CARGO_MANIFEST_DIR"), "/.env"));
    let _ = from_filename(".env");
}

fn router(client: CacheClient) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/kv/{key}", put(put_kv).get(get_kv).delete(delete_kv))
        .with_state(AppState { client })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();

    load_env_for_workspace();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = ApiConfig::from_env()?;
    let client = CacheClient::open(&cfg.cache)?;

    let app = router(client.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));

    info!("HTTP server listening on http://{addr}");

    let listener = TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    client.close();
    served?;

    Ok(())
}
