use crate::infra::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use deal_radar::error::AppError;
use deal_radar::pipeline::{PropertyService, QueryParams};
use deal_radar::scoring::ScoredListing;
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_property_routes(service: Arc<PropertyService>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(healthcheck).head(health_head))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/properties", get(list_properties))
        .route("/property/:id", get(property_by_id))
        .with_state(service)
}

pub(crate) async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "endpoints": ["/health", "/ready", "/metrics", "/properties", "/property/{id}"],
    }))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn health_head() -> StatusCode {
    StatusCode::OK
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn list_properties(
    State(service): State<Arc<PropertyService>>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Vec<ScoredListing>>, AppError> {
    Ok(Json(service.list(&params)?))
}

pub(crate) async fn property_by_id(
    State(service): State<Arc<PropertyService>>,
    Path(id): Path<String>,
) -> Response {
    match service.get(&id) {
        Some(scored) => Json(scored).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response(),
    }
}
