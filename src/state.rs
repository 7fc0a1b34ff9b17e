//! Application state and UI action dispatch.
//!
//! All collections, UI selections, playback state and both overlays live in
//! one [`App`]. Control endpoints never touch its fields; they send a
//! [`UiAction`] through [`dispatch`], which validates it, applies the state
//! transition, re-renders, and (re)arms the playback ticker when needed.

use std::sync::Arc;

use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::error::ControlError;
use crate::models::{BloomType, Intensity, LatLng, Observation};
use crate::overlay::{LayerId, SceneOverlay};
use crate::playback::{self, Arm, Playback, PlaybackStatus};
use crate::render::{self, DataSource, Filters, ObservationStats};
use crate::store::RecordStore;
use crate::tables::LookupTables;
use crate::timeline::{TimeIndex, TimeRange, MONTHS};

// ---

pub type SharedApp = Arc<Mutex<App>>;

/// The 3D globe only draws bloom observations.
const GLOBE_LAYERS: [LayerId; 1] = [LayerId::Blooms];

/// A state-transition request from one UI control.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UiAction {
    SetDataSource {
        value: DataSource,
    },
    SetBloomType {
        #[serde(deserialize_with = "all_or")]
        value: Option<BloomType>,
    },
    SetIntensity {
        #[serde(deserialize_with = "all_or")]
        value: Option<Intensity>,
    },
    SetTimeRange {
        value: TimeRange,
    },
    SetTimeSlider {
        value: usize,
    },
    SetConfidence {
        value: usize,
    },
    SetOpacity {
        value: usize,
    },
    SetLayerVisibility {
        layer: LayerId,
        visible: bool,
    },
    SetRegion {
        value: String,
    },
    Play,
    Pause,
    Reset,
    ChangeSpeed,
}

/// `"all"` clears a selector; anything else must name a variant.
fn all_or<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = String::deserialize(deserializer)?;
    if raw == "all" {
        return Ok(None);
    }
    let value: serde::de::value::StringDeserializer<D::Error> = raw.into_deserializer();
    T::deserialize(value).map(Some)
}

#[derive(Debug, Clone, Serialize)]
pub struct AppStatus {
    pub filters: Filters,
    pub playback: PlaybackStatus,
    pub month_counts: [usize; MONTHS],
    pub total_records: usize,
}

/// Result of a map click lookup.
#[derive(Debug, Clone, Serialize)]
pub struct NearestResult {
    pub found: bool,
    pub distance_km: Option<f64>,
    pub observation: Option<Observation>,
    pub message: String,
}

pub struct App {
    // ---
    tables: LookupTables,
    store: RecordStore,
    index: TimeIndex,
    filters: Filters,
    playback: Playback,
    map: SceneOverlay,
    globe: SceneOverlay,
    nearest_radius_km: f64,
    ticker: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(tables: LookupTables, store: RecordStore, nearest_radius_km: f64) -> Self {
        // ---
        let index = TimeIndex::build(&store);
        let filters = Filters::default();
        let viewport = tables.viewport(&filters.region);
        let mut app = Self {
            map: SceneOverlay::new(viewport.center, viewport.zoom),
            globe: SceneOverlay::new(viewport.center, viewport.zoom),
            tables,
            store,
            index,
            filters,
            playback: Playback::new(),
            nearest_radius_km,
            ticker: None,
        };
        app.render();
        app
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn map(&self) -> &SceneOverlay {
        &self.map
    }

    pub fn globe(&self) -> &SceneOverlay {
        &self.globe
    }

    pub fn status(&self) -> AppStatus {
        AppStatus {
            filters: self.filters.clone(),
            playback: self.playback.status(),
            month_counts: self.index.observation_counts(),
            total_records: self.store.total(),
        }
    }

    /// Redraw both overlays from the current filters.
    pub fn render(&mut self) {
        // ---
        let frames = render::render(&self.store, &self.index, &self.tables, &self.filters);
        render::apply(&frames, &self.tables, &self.filters, &mut self.map, &LayerId::ALL);
        render::apply(&frames, &self.tables, &self.filters, &mut self.globe, &GLOBE_LAYERS);
        tracing::debug!(
            "Rendered {} bloom markers (month {:?}, region {})",
            self.map.marker_count(LayerId::Blooms),
            self.filters.month,
            self.filters.region
        );
    }

    pub fn visible_observations(&self) -> Vec<&Observation> {
        render::select_observations(&self.store, &self.index, &self.tables, &self.filters)
    }

    pub fn stats(&self) -> ObservationStats {
        ObservationStats::collect(&self.visible_observations())
    }

    /// Nearest visible observation to a clicked point.
    pub fn nearest(&self, point: LatLng) -> NearestResult {
        // ---
        let radius_km = self.nearest_radius_km;
        match render::nearest_observation(self.visible_observations(), point, radius_km) {
            Some((obs, distance)) => NearestResult {
                found: true,
                distance_km: Some(distance),
                message: format!("{} bloom {:.1} km away", obs.species, distance),
                observation: Some(obs.clone()),
            },
            None => NearestResult {
                found: false,
                distance_km: None,
                observation: None,
                message: format!("No bloom data found within {} km", self.nearest_radius_km),
            },
        }
    }

    fn disarm(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    /// Apply one action. Returns a timer the caller must arm.
    pub fn apply(&mut self, action: UiAction) -> Result<Option<Arm>, ControlError> {
        // ---
        tracing::debug!("Dispatching {:?}", action);
        let mut arm = None;

        match action {
            UiAction::SetDataSource { value } => self.filters.data_source = value,
            UiAction::SetBloomType { value } => self.filters.bloom_type = value,
            UiAction::SetIntensity { value } => self.filters.intensity = value,
            UiAction::SetTimeRange { value } => self.filters.time_range = value,
            UiAction::SetTimeSlider { value } => {
                check_range("time slider", value, MONTHS - 1)?;
                self.playback.seek(value);
                self.filters.month = Some(value);
            }
            UiAction::SetConfidence { value } => {
                self.filters.min_confidence = percent("confidence", value)?;
            }
            UiAction::SetOpacity { value } => {
                self.filters.opacity = percent("opacity", value)?;
            }
            UiAction::SetLayerVisibility { layer, visible } => {
                self.filters.visible.insert(layer, visible);
            }
            UiAction::SetRegion { value } => {
                if !self.tables.viewports.contains_key(&value) {
                    return Err(ControlError::UnknownRegion(value));
                }
                self.filters.region = value;
            }
            UiAction::Play => {
                arm = self.playback.start();
                self.filters.month = Some(self.playback.index());
            }
            UiAction::Pause => {
                self.playback.pause();
                self.disarm();
            }
            UiAction::Reset => {
                self.playback.reset();
                self.disarm();
                self.filters.month = None;
            }
            UiAction::ChangeSpeed => {
                arm = self.playback.change_speed();
                if arm.is_some() {
                    self.disarm();
                }
            }
        }

        self.render();
        Ok(arm)
    }

    /// Timer callback. Returns `false` once the timer is stale.
    pub fn on_tick(&mut self, epoch: u64) -> bool {
        // ---
        match self.playback.tick(epoch) {
            Some(month) => {
                tracing::debug!("Playback tick: month {}", month);
                self.filters.month = Some(month);
                self.render();
                true
            }
            None => false,
        }
    }
}

fn check_range(control: &'static str, value: usize, max: usize) -> Result<(), ControlError> {
    if value > max {
        return Err(ControlError::OutOfRange {
            control,
            value,
            max,
        });
    }
    Ok(())
}

fn percent(control: &'static str, value: usize) -> Result<u8, ControlError> {
    check_range(control, value, 100)?;
    Ok(value as u8)
}

/// Build the shared application from tables and a generated store.
pub fn shared(tables: LookupTables, store: RecordStore, nearest_radius_km: f64) -> SharedApp {
    Arc::new(Mutex::new(App::new(tables, store, nearest_radius_km)))
}

/// Apply `action` and arm the ticker it asks for, under a single lock.
pub async fn dispatch(shared: &SharedApp, action: UiAction) -> Result<AppStatus, ControlError> {
    // ---
    let mut app = shared.lock().await;
    if let Some(arm) = app.apply(action)? {
        let handle = playback::spawn_ticker(shared.clone(), arm, App::on_tick);
        app.ticker = Some(handle);
    }
    Ok(app.status())
}
