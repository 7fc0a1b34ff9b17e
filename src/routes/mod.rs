//! Route gateway: merges every endpoint subrouter and attaches the shared
//! application state.
use axum::Router;

use crate::SharedApp;

mod actions;
mod health;
mod map;
mod queries;

// ---

pub fn router(app: SharedApp) -> Router {
    // ---
    Router::new()
        .merge(actions::router())
        .merge(map::router())
        .merge(queries::router())
        .merge(health::router())
        .with_state(app)
}
