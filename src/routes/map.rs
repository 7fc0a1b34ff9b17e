//! Overlay snapshots for the browser map and globe.

use axum::{extract::Path, extract::State, routing::get, Json, Router};

use crate::overlay::SceneOverlay;
use crate::{ControlError, SharedApp};

// ---

pub fn router() -> Router<SharedApp> {
    Router::new().route("/map/{view}", get(handler))
}

/// `GET /map/map` for the 2D map, `GET /map/globe` for the 3D globe.
async fn handler(
    Path(view): Path<String>,
    State(app): State<SharedApp>,
) -> Result<Json<SceneOverlay>, ControlError> {
    // ---
    let app = app.lock().await;
    let scene = match view.as_str() {
        "map" => app.map().clone(),
        "globe" => app.globe().clone(),
        _ => return Err(ControlError::UnknownView(view)),
    };
    Ok(Json(scene))
}
