//! UI control endpoint.
//!
//! Every control (selectors, sliders, layer toggles, playback buttons) posts
//! a tagged [`UiAction`] to `/actions`, e.g.
//! `{"action": "set_intensity", "value": "high"}` or `{"action": "play"}`.
//! The response is the application status after the transition.

use axum::{extract::State, routing::post, Json, Router};
use tracing::info;

use crate::state::{self, AppStatus};
use crate::{ControlError, SharedApp, UiAction};

// ---

pub fn router() -> Router<SharedApp> {
    // ---
    Router::new().route("/actions", post(handler))
}

async fn handler(
    State(app): State<SharedApp>,
    Json(action): Json<UiAction>,
) -> Result<Json<AppStatus>, ControlError> {
    // ---
    info!("POST /actions - {:?}", action);
    let status = state::dispatch(&app, action).await?;
    Ok(Json(status))
}
