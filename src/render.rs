//! Filter/render coordinator.
//!
//! `render` turns the record store and the current UI filters into one
//! [`LayerFrame`] per layer; `apply` pushes those frames into an overlay,
//! replacing each layer's markers wholesale.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    AgriculturalField, BloomType, CitizenReport, ClimateSample, Intensity, LatLng, Observation,
};
use crate::overlay::{LayerId, MapOverlay, MarkerStyle};
use crate::store::RecordStore;
use crate::tables::{LookupTables, RegionViewport, GLOBAL_REGION};
use crate::timeline::{TimeIndex, TimeRange};

// ---

/// Which feed the data-source selector shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    All,
    Satellite,
    Citizen,
    Climate,
    Agricultural,
}

impl DataSource {
    pub fn includes(self, layer: LayerId) -> bool {
        match self {
            DataSource::All => true,
            DataSource::Satellite => layer == LayerId::Blooms,
            DataSource::Citizen => layer == LayerId::Citizen,
            DataSource::Climate => layer == LayerId::Climate,
            DataSource::Agricultural => layer == LayerId::Agriculture,
        }
    }
}

/// Current UI selections.
#[derive(Debug, Clone, Serialize)]
pub struct Filters {
    // ---
    pub data_source: DataSource,
    /// `None` means "all".
    pub bloom_type: Option<BloomType>,
    pub intensity: Option<Intensity>,
    pub time_range: TimeRange,
    /// Selected month, widened by `time_range`. `None` shows every month.
    pub month: Option<usize>,
    /// Minimum confidence in percent, 0-100.
    pub min_confidence: u8,
    /// Layer opacity in percent, 0-100.
    pub opacity: u8,
    pub region: String,
    pub visible: BTreeMap<LayerId, bool>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            data_source: DataSource::All,
            bloom_type: None,
            intensity: None,
            time_range: TimeRange::Month,
            month: None,
            min_confidence: 0,
            opacity: 80,
            region: GLOBAL_REGION.to_string(),
            visible: LayerId::ALL.iter().map(|&l| (l, true)).collect(),
        }
    }
}

impl Filters {
    pub fn shows(&self, layer: LayerId) -> bool {
        self.data_source.includes(layer) && self.visible.get(&layer).copied().unwrap_or(true)
    }

    fn months(&self) -> Option<Vec<usize>> {
        self.month.map(|m| self.time_range.months(m))
    }

    fn accepts(&self, obs: &Observation) -> bool {
        // ---
        self.bloom_type.map_or(true, |t| obs.bloom_type == t)
            && self.intensity.map_or(true, |i| obs.intensity == i)
            && obs.confidence * 100.0 >= f64::from(self.min_confidence)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub position: LatLng,
    pub style: MarkerStyle,
    pub popup: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayerFrame {
    pub layer: LayerId,
    pub markers: Vec<Marker>,
}

/// Marker radius for a bloom area in hectares.
pub fn bloom_size(area: f64) -> u32 {
    if area < 200.0 {
        8
    } else if area < 500.0 {
        12
    } else if area < 800.0 {
        16
    } else {
        20
    }
}

fn temperature_color(temperature_c: f64) -> &'static str {
    if temperature_c < 20.0 {
        "#4169E1"
    } else if temperature_c < 25.0 {
        "#32CD32"
    } else if temperature_c < 30.0 {
        "#FFA500"
    } else {
        "#DC143C"
    }
}

fn style(radius: u32, fill_color: &str) -> MarkerStyle {
    MarkerStyle {
        radius,
        fill_color: fill_color.to_string(),
        color: "#ffffff".to_string(),
        weight: 1,
        fill_opacity: 0.8,
    }
}

/// Observations passing every filter, in store order.
pub fn select_observations<'a>(
    store: &'a RecordStore,
    index: &TimeIndex,
    tables: &LookupTables,
    filters: &Filters,
) -> Vec<&'a Observation> {
    // ---
    let viewport = tables.viewport(&filters.region);
    let candidates: Box<dyn Iterator<Item = &'a Observation> + 'a> = match filters.months() {
        Some(months) => Box::new(
            index
                .observations_in(&months)
                .into_iter()
                .map(move |i| &store.observations[i]),
        ),
        None => Box::new(store.observations.iter()),
    };
    candidates
        .filter(|o| viewport.includes(&o.country) && filters.accepts(o))
        .collect()
}

fn select_citizen_reports<'a>(
    store: &'a RecordStore,
    index: &TimeIndex,
    viewport: &RegionViewport,
    filters: &Filters,
) -> Vec<&'a CitizenReport> {
    let candidates: Vec<&CitizenReport> = match filters.months() {
        Some(months) => index
            .citizen_reports_in(&months)
            .into_iter()
            .map(|i| &store.citizen_reports[i])
            .collect(),
        None => store.citizen_reports.iter().collect(),
    };
    candidates
        .into_iter()
        .filter(|r| viewport.includes(&r.country))
        .collect()
}

fn climate_in_region<'a>(
    store: &'a RecordStore,
    tables: &LookupTables,
    viewport: &RegionViewport,
) -> Vec<&'a ClimateSample> {
    // Climate samples carry the seed name, not a country
    store
        .climate_samples
        .iter()
        .filter(|s| {
            tables
                .regions
                .iter()
                .find(|seed| seed.name == s.region)
                .map_or(viewport.countries.is_empty(), |seed| viewport.includes(&seed.country))
        })
        .collect()
}

fn observation_popup(obs: &Observation) -> String {
    format!(
        "<div class=\"bloom-popup\"><h4>{}</h4>\
         <p><strong>Type:</strong> {}</p>\
         <p><strong>Intensity:</strong> {}</p>\
         <p><strong>Confidence:</strong> {:.0}%</p>\
         <p><strong>Area:</strong> {:.1} ha</p>\
         <p><strong>Date:</strong> {}</p>\
         <p><strong>Location:</strong> {}, {}</p>\
         <p><strong>Climate impact:</strong> {:.2}</p>\
         <p><strong>Ecosystem health:</strong> {:.2}</p>\
         <p><strong>Agricultural value:</strong> {:.2}</p></div>",
        obs.species,
        obs.bloom_type.label(),
        obs.intensity.label(),
        obs.confidence * 100.0,
        obs.area_hectares,
        obs.date,
        obs.region,
        obs.country,
        obs.climate_impact,
        obs.ecosystem_health,
        obs.agricultural_value,
    )
}

fn citizen_popup(report: &CitizenReport) -> String {
    format!(
        "<div class=\"citizen-popup\"><h4>{}</h4>\
         <p><strong>Observer:</strong> {}</p>\
         <p><strong>Date:</strong> {}</p>\
         <p><strong>Status:</strong> {}</p></div>",
        report.species,
        report.observer,
        report.date,
        if report.validated { "Validated" } else { "Pending" },
    )
}

fn climate_popup(sample: &ClimateSample) -> String {
    format!(
        "<div class=\"climate-popup\"><h4>{}</h4>\
         <p><strong>Temperature:</strong> {:.1}°C</p>\
         <p><strong>Precipitation:</strong> {:.1} mm</p>\
         <p><strong>Humidity:</strong> {:.0}%</p>\
         <p><strong>Wind:</strong> {:.1} km/h</p>\
         <p><strong>Pressure:</strong> {:.0} hPa</p>\
         <p><strong>Zone:</strong> {:?}</p>\
         <p><strong>Bloom correlation:</strong> {:.2}</p></div>",
        sample.region,
        sample.temperature_c,
        sample.precipitation_mm,
        sample.humidity,
        sample.wind_speed_kmh,
        sample.pressure_hpa,
        sample.climate_zone,
        sample.bloom_correlation,
    )
}

fn field_popup(field: &AgriculturalField) -> String {
    format!(
        "<div class=\"field-popup\"><h4>{}</h4>\
         <p><strong>Planted:</strong> {}</p>\
         <p><strong>Bloom timing:</strong> {}</p>\
         <p><strong>Harvest:</strong> {}</p>\
         <p><strong>Yield estimate:</strong> {:.1} t/ha</p>\
         <p><strong>Harvest prediction:</strong> {:.1} t/ha</p>\
         <p><strong>Soil moisture:</strong> {:.0}%</p>\
         <p><strong>Pest pressure:</strong> {:.0}%</p></div>",
        field.crop,
        field.planting_date,
        field.bloom_timing,
        field.harvest_date,
        field.yield_estimate,
        field.harvest_prediction,
        field.soil_moisture * 100.0,
        field.pest_pressure * 100.0,
    )
}

/// Build one frame per layer. Hidden layers get an empty frame so that
/// applying it clears whatever the overlay showed before.
pub fn render(
    store: &RecordStore,
    index: &TimeIndex,
    tables: &LookupTables,
    filters: &Filters,
) -> Vec<LayerFrame> {
    // ---
    let viewport = tables.viewport(&filters.region);

    LayerId::ALL
        .iter()
        .map(|&layer| {
            let markers = if !filters.shows(layer) {
                Vec::new()
            } else {
                match layer {
                    LayerId::Blooms => select_observations(store, index, tables, filters)
                        .into_iter()
                        .map(|o| Marker {
                            position: o.position,
                            style: style(
                                bloom_size(o.area_hectares),
                                tables.intensity_color(o.intensity),
                            ),
                            popup: observation_popup(o),
                        })
                        .collect(),
                    LayerId::Citizen => select_citizen_reports(store, index, &viewport, filters)
                        .into_iter()
                        .map(|r| Marker {
                            position: r.position,
                            style: style(6, if r.validated { "#2E8B57" } else { "#A9A9A9" }),
                            popup: citizen_popup(r),
                        })
                        .collect(),
                    LayerId::Climate => climate_in_region(store, tables, &viewport)
                        .into_iter()
                        .map(|s| Marker {
                            position: s.position,
                            style: style(10, temperature_color(s.temperature_c)),
                            popup: climate_popup(s),
                        })
                        .collect(),
                    LayerId::Agriculture => store
                        .agricultural_fields
                        .iter()
                        .filter(|f| viewport.includes(&f.country))
                        .map(|f| Marker {
                            position: f.position,
                            style: style(9, tables.crop_color(&f.crop)),
                            popup: field_popup(f),
                        })
                        .collect(),
                }
            };
            LayerFrame { layer, markers }
        })
        .collect()
}

/// Replace the contents of every layer in `scope` with its frame and move
/// the viewport to the selected region.
pub fn apply<O: MapOverlay + ?Sized>(
    frames: &[LayerFrame],
    tables: &LookupTables,
    filters: &Filters,
    overlay: &mut O,
    scope: &[LayerId],
) {
    // ---
    let opacity = f64::from(filters.opacity) / 100.0;
    for frame in frames.iter().filter(|f| scope.contains(&f.layer)) {
        overlay.clear_layer(frame.layer);
        for marker in &frame.markers {
            let handle = overlay.add_marker(frame.layer, marker.position, &marker.style);
            overlay.bind_popup(handle, &marker.popup);
        }
        overlay.set_layer_opacity(frame.layer, opacity);
    }

    let viewport = tables.viewport(&filters.region);
    overlay.set_viewport(viewport.center, viewport.zoom);
}

/// Closest observation within `radius_km` of a clicked point.
pub fn nearest_observation<'a, I>(
    observations: I,
    point: LatLng,
    radius_km: f64,
) -> Option<(&'a Observation, f64)>
where
    I: IntoIterator<Item = &'a Observation>,
{
    observations
        .into_iter()
        .map(|o| (o, o.position.distance_km(&point)))
        .filter(|(_, d)| *d <= radius_km)
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Aggregates over a rendered observation set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObservationStats {
    pub count: usize,
    pub by_intensity: BTreeMap<String, usize>,
    pub mean_confidence: f64,
    pub total_area_hectares: f64,
    pub mean_climate_impact: f64,
    pub mean_ecosystem_health: f64,
    pub mean_agricultural_value: f64,
}

impl ObservationStats {
    pub fn collect(observations: &[&Observation]) -> Self {
        // ---
        let count = observations.len();
        let mut stats = ObservationStats {
            count,
            by_intensity: Intensity::ALL.iter().map(|i| (i.label().to_string(), 0)).collect(),
            ..Default::default()
        };
        if count == 0 {
            return stats;
        }

        for obs in observations {
            *stats.by_intensity.entry(obs.intensity.label().to_string()).or_default() += 1;
            stats.mean_confidence += obs.confidence;
            stats.total_area_hectares += obs.area_hectares;
            stats.mean_climate_impact += obs.climate_impact;
            stats.mean_ecosystem_health += obs.ecosystem_health;
            stats.mean_agricultural_value += obs.agricultural_value;
        }

        let n = count as f64;
        stats.mean_confidence /= n;
        stats.mean_climate_impact /= n;
        stats.mean_ecosystem_health /= n;
        stats.mean_agricultural_value /= n;
        stats
    }
}
