// Handlers: version, sensor catalog, widget data

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use super::AppState;
use crate::error::EngineError;
use crate::models::{WidgetDataRequest, WidgetDataResponse};
use crate::version::{NAME, VERSION};

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/sensors — the sensor catalog (internal names + bucketing strategies).
pub(super) async fn sensors_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.engine.catalog().entries().to_vec())
}

/// POST /api/widget-data — runs the full pipeline for one widget request.
pub(super) async fn widget_data_handler(
    State(state): State<AppState>,
    Json(req): Json<WidgetDataRequest>,
) -> Result<Json<WidgetDataResponse>, (StatusCode, Json<serde_json::Value>)> {
    match state.engine.widget_data(&req).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => Err(error_response(e)),
    }
}

/// The error taxonomy stays machine-readable on the wire: stable `error`
/// kind plus the human message.
fn error_response(e: EngineError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &e {
        EngineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        EngineError::UnknownSensor(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::UnknownBucketingStrategy(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::UpstreamFetch(_) => StatusCode::BAD_GATEWAY,
    };
    tracing::warn!(error = %e, kind = e.kind(), "widget data request failed");
    (
        status,
        Json(serde_json::json!({
            "error": e.kind(),
            "message": e.to_string(),
        })),
    )
}
