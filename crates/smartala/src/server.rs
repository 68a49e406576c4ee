//! JSON-over-HTTP transport for the navigation service.
//!
//! Exposes:
//! - `GET /health`: liveness and registry size
//! - `POST /save_location`: save a place, returns its id and link
//! - `GET /get_location_info/:id`: fetch a saved place
//! - `GET /location/:id`: fetch a saved place ready for auto-navigation
//! - `GET /list_saved_locations`: all saved places, newest first
//! - `POST /get_route`: synthesize a walking route
//!
//! Every response carries a `success` flag; failures add an `error` message.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::registry::NewLocation;
use crate::service::{NavigationService, RouteRequest};

/// Shared handler state.
type AppState = Arc<NavigationService>;

/// Error wrapper that renders as a JSON failure body.
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status for the wrapped error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        let body = json!({ "success": false, "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

type ApiResult = std::result::Result<Json<Value>, ApiError>;

/// JSON request body, or the extractor's reason for refusing it.
type JsonBody<T> = std::result::Result<Json<T>, JsonRejection>;

/// Unwrap a request body; a body that does not fit `T` is a validation error.
fn json_body<T>(payload: JsonBody<T>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| Error::validation(rejection.body_text()))
}

/// Serialize `payload` and mark it successful.
fn success(payload: impl Serialize) -> ApiResult {
    let mut value = serde_json::to_value(payload).map_err(Error::from)?;
    match value.as_object_mut() {
        Some(object) => {
            object.insert("success".to_string(), Value::Bool(true));
            Ok(Json(value))
        }
        None => Err(Error::internal("response payload is not an object").into()),
    }
}

/// Build the router over a shared service.
pub fn router(service: Arc<NavigationService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/save_location", post(save_location))
        .route("/get_location_info/:id", get(get_location_info))
        .route("/location/:id", get(open_location))
        .route("/list_saved_locations", get(list_saved_locations))
        .route("/get_route", post(get_route))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Bind `addr` and serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(service: Arc<NavigationService>, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);

    let app = router(service).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
    }
}

// ============================================================================
// Route handlers
// ============================================================================

async fn health(State(service): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "saved_locations": service.registry().len(),
    }))
}

/// POST /save_location
async fn save_location(
    State(service): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    payload: JsonBody<NewLocation>,
) -> ApiResult {
    let request = json_body(payload)?;
    let created = service.create_location(&request, &peer.ip().to_string())?;
    success(created)
}

/// GET /get_location_info/:id
async fn get_location_info(State(service): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let location = service.resolve_location(&id)?;
    success(json!({ "location": location }))
}

/// GET /location/:id
async fn open_location(State(service): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let destination = service.navigation_target(&id)?;
    success(json!({ "destination": destination }))
}

/// GET /list_saved_locations
async fn list_saved_locations(State(service): State<AppState>) -> ApiResult {
    success(service.list_locations())
}

/// POST /get_route
async fn get_route(State(service): State<AppState>, payload: JsonBody<RouteRequest>) -> ApiResult {
    let request = json_body(payload)?;
    let route = service.plan_route(&request)?;
    success(json!({ "route": route }))
}
