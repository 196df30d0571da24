//! REST API handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use genvlab_core::{ActivateRequest, Device, Environment};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::registry::Registry;

/// Application state shared across handlers
pub struct AppState {
    pub registry: Arc<Registry>,
}

/// Create the API router with every route under `/<namespace>`
pub fn create_router(registry: Arc<Registry>, namespace: &str) -> Router {
    let state = Arc::new(AppState { registry });

    let api = Router::new()
        .route("/devices", get(list_devices))
        .route("/envs", get(list_envs))
        .route("/find", get(find_binding))
        .route("/activate", post(activate_binding))
        .with_state(state);

    Router::new()
        .nest(&format!("/{}", namespace.trim_matches('/')), api)
        .layer(TraceLayer::new_for_http())
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            message: message.to_string(),
        }),
    )
}

/// Device table
async fn list_devices(State(state): State<Arc<AppState>>) -> Json<Vec<Device>> {
    Json(state.registry.devices().await)
}

/// Active environments
async fn list_envs(State(state): State<Arc<AppState>>) -> Json<Vec<Environment>> {
    Json(state.registry.environments().await)
}

/// Query of the find endpoint
#[derive(Debug, Deserialize)]
pub struct FindQuery {
    pub kernel_id: String,
}

/// Bound environment of a kernel; empty body when unbound
async fn find_binding(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FindQuery>,
) -> Response {
    match state.registry.find(&query.kernel_id).await {
        Some(eid) => Json(eid).into_response(),
        None => StatusCode::OK.into_response(),
    }
}

/// Bind a kernel to an environment
async fn activate_binding(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ActivateRequest>,
) -> Result<StatusCode, ApiError> {
    if req.kernel_id.is_empty() {
        return Err(bad_request("kernel_id must not be empty"));
    }
    if req.eid.is_empty() {
        return Err(bad_request("eid must not be empty"));
    }

    info!(kernel_id = %req.kernel_id, eid = %req.eid, "Activating binding");
    state.registry.activate(&req.kernel_id, &req.eid).await;

    Ok(StatusCode::OK)
}
