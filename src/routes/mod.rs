// HTTP routes

mod http;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::engine::Engine;
use crate::sample_repo::SampleRepo;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) engine: Arc<Engine<SampleRepo>>,
}

pub fn app(engine: Arc<Engine<SampleRepo>>) -> Router {
    let state = AppState { engine };
    Router::new()
        .route("/", get(|| async { "Ktor: Hello from Rust sensorhub!" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/sensors", get(http::sensors_handler)) // GET /api/sensors
        .route("/api/widget-data", post(http::widget_data_handler)) // POST /api/widget-data
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
