use axum::extract::State;
use serde_json::{json, Value};

use crate::config::messages;
use crate::context::AppContext;
use crate::entities::ENTITIES;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

pub async fn root() -> ApiResult<Value> {
    let endpoints: Vec<String> = ENTITIES.iter().map(|e| format!("/api/v1/{}", e.path)).collect();
    Ok(ApiResponse::ok(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": endpoints,
        "login": "/api/v1/usuarios/login",
    })))
}

pub async fn health(State(ctx): State<AppContext>) -> ApiResult<Value> {
    match ctx.store.ping().await {
        Ok(()) => Ok(ApiResponse::ok(json!({
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "database": "ok",
        }))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Err(ApiError::service_unavailable(messages::SERVICIO_NO_DISPONIBLE))
        }
    }
}
