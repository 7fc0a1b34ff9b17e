//! Record types held by the bloom record store.
//!
//! All four collections are flat, immutable records. Derived fields are
//! filled in by the generator through the `metrics` calculator at creation
//! time and never recomputed afterwards.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance in kilometres (haversine).
    pub fn distance_km(&self, other: &LatLng) -> f64 {
        // ---
        const EARTH_RADIUS_KM: f64 = 6_371.0;
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Moderate,
    High,
    Extreme,
}

impl Intensity {
    pub const ALL: [Intensity; 4] = [
        Intensity::Low,
        Intensity::Moderate,
        Intensity::High,
        Intensity::Extreme,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Intensity::Low => "low",
            Intensity::Moderate => "moderate",
            Intensity::High => "high",
            Intensity::Extreme => "extreme",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BloomType {
    Superbloom,
    Wildflower,
    Agricultural,
    Urban,
}

impl BloomType {
    pub const ALL: [BloomType; 4] = [
        BloomType::Superbloom,
        BloomType::Wildflower,
        BloomType::Agricultural,
        BloomType::Urban,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BloomType::Superbloom => "superbloom",
            BloomType::Wildflower => "wildflower",
            BloomType::Agricultural => "agricultural",
            BloomType::Urban => "urban",
        }
    }
}

/// A single synthetic flowering event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    // ---
    pub id: Uuid,
    pub position: LatLng,
    pub intensity: Intensity,
    pub bloom_type: BloomType,
    pub species: String,
    pub confidence: f64,
    pub date: NaiveDate,
    pub area_hectares: f64,
    pub country: String,
    pub region: String,
    pub climate_impact: f64,
    pub ecosystem_health: f64,
    pub agricultural_value: f64,
}

impl Observation {
    /// Zero-based month of the observation date.
    pub fn month(&self) -> usize {
        self.date.month0() as usize
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitizenReport {
    // ---
    pub id: Uuid,
    pub position: LatLng,
    pub species: String,
    pub date: NaiveDate,
    pub observer: String,
    pub validated: bool,
    pub country: String,
}

impl CitizenReport {
    pub fn month(&self) -> usize {
        self.date.month0() as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClimateZone {
    Tropical,
    Subtropical,
    Temperate,
    Polar,
}

impl ClimateZone {
    /// Zone boundaries follow the tropics and polar circles.
    pub fn from_latitude(lat: f64) -> Self {
        // ---
        let lat = lat.abs();
        if lat < 23.5 {
            ClimateZone::Tropical
        } else if lat < 35.0 {
            ClimateZone::Subtropical
        } else if lat < 66.5 {
            ClimateZone::Temperate
        } else {
            ClimateZone::Polar
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimateSample {
    // ---
    pub id: Uuid,
    pub position: LatLng,
    pub temperature_c: f64,
    pub precipitation_mm: f64,
    pub humidity: f64,
    pub wind_speed_kmh: f64,
    pub pressure_hpa: f64,
    pub region: String,
    pub climate_zone: ClimateZone,
    pub bloom_correlation: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgriculturalField {
    // ---
    pub id: Uuid,
    pub position: LatLng,
    pub crop: String,
    pub planting_date: NaiveDate,
    pub harvest_date: NaiveDate,
    pub yield_estimate: f64,
    pub soil_moisture: f64,
    pub fertilizer_level: f64,
    pub pest_pressure: f64,
    pub country: String,
    pub bloom_timing: NaiveDate,
    pub harvest_prediction: f64,
}
