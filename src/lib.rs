//! `bloomscope`: time-indexed bloom observation layers for interactive maps.
//!
//! Synthetic bloom observations, citizen reports, climate samples and
//! agricultural fields are generated once at startup, bucketed by month,
//! filtered by the current UI selections and pushed into map overlays.
//! The UI controls are exposed as HTTP endpoints by the `routes` gateway.
//!
//! Module layout follows the Explicit Module Boundary Pattern (EMBP): each
//! module exposes a small surface and the gateway (`routes`) is the only
//! place that knows about HTTP.

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod overlay;
pub mod playback;
pub mod render;
pub mod routes;
pub mod state;
pub mod store;
pub mod tables;
pub mod timeline;

pub use config::Config;
pub use error::ControlError;
pub use state::{App, SharedApp, UiAction};

// ---

/// Load the lookup tables, generate the record store and build the shared
/// application state with its first render.
pub fn bootstrap(cfg: &Config) -> SharedApp {
    // ---
    let tables = tables::LookupTables::load_or_builtin(cfg.lookup_tables_path.as_deref());
    let store = store::generate(&tables, cfg.records_per_region, cfg.observation_year);
    state::shared(tables, store, cfg.nearest_radius_km)
}
