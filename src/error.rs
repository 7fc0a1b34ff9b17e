//! Errors surfaced by the control endpoints.
//!
//! The record pipeline itself has no failure modes; only malformed UI
//! input is rejected.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ControlError {
    #[error("{control} must be between 0 and {max}, got {value}")]
    OutOfRange {
        control: &'static str,
        value: usize,
        max: usize,
    },

    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("Unknown map view: {0}")]
    UnknownView(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ControlError {
    fn into_response(self) -> Response {
        // ---
        let status = match self {
            ControlError::UnknownView(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        tracing::warn!("Rejected control input: {}", self);
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
