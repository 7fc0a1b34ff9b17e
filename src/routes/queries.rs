//! Read-only views over the application state.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::debug;

use crate::models::LatLng;
use crate::render::ObservationStats;
use crate::state::{AppStatus, NearestResult};
use crate::SharedApp;

// ---

pub fn router() -> Router<SharedApp> {
    // ---
    Router::new()
        .route("/state", get(status))
        .route("/stats", get(stats))
        .route("/observations/nearest", get(nearest))
}

async fn status(State(app): State<SharedApp>) -> Json<AppStatus> {
    Json(app.lock().await.status())
}

/// Aggregates over the observations currently drawn on the map.
async fn stats(State(app): State<SharedApp>) -> Json<ObservationStats> {
    Json(app.lock().await.stats())
}

/// Query parameters for a map click
#[derive(Debug, Deserialize)]
pub struct ClickQuery {
    lat: f64,
    lng: f64,
}

async fn nearest(
    Query(click): Query<ClickQuery>,
    State(app): State<SharedApp>,
) -> Json<NearestResult> {
    // ---
    debug!("GET /observations/nearest - {:?}", click);
    let result = app.lock().await.nearest(LatLng::new(click.lat, click.lng));
    Json(result)
}
