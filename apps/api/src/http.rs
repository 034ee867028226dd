use std::time::Instant;

use app_cache::CacheClient;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::AppError;

#[derive(Clone)]
pub struct AppState {
    pub client: CacheClient,
}

#[derive(Deserialize)]
pub struct PutBody {
    value: String,
    /// Seconds; every write expires.
    ttl: u64,
}

#[derive(Serialize)]
pub struct StatusResponse {
    redis: bool,
}

#[derive(Serialize)]
pub struct PutResponse {
    key: String,
    elapsed_ms: u128,
}

#[derive(Serialize)]
pub struct GetResponse {
    key: String,
    value: Option<String>,
    elapsed_ms: u128,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("AppError: {self:?}");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatusResponse {
        redis: state.client.is_alive(),
    })
}

pub async fn get_kv(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let start = Instant::now();
    let value = state.client.get(&key).await?;
    let elapsed_ms = start.elapsed().as_millis();

    let code = if value.is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };

    Ok((
        code,
        Json(GetResponse {
            key,
            value,
            elapsed_ms,
        }),
    ))
}

pub async fn put_kv(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(body): Json<PutBody>,
) -> Result<impl IntoResponse, AppError> {
    let start = Instant::now();
    state.client.set(&key, &body.value, body.ttl).await?;
    let elapsed_ms = start.elapsed().as_millis();

    Ok((StatusCode::OK, Json(PutResponse { key, elapsed_ms })))
}

pub async fn delete_kv(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.client.del(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}
