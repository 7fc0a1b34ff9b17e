//! Record store and synthetic record generator.
//!
//! Every region seed contributes `count` records to each of the four
//! collections. Positions are jittered uniformly around the seed center and
//! categorical fields are drawn uniformly from the lookup tables. The
//! generator is unseeded by default; `generate_with_rng` accepts any RNG.

use chrono::{Datelike, Days, Months, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::metrics;
use crate::models::{
    AgriculturalField, BloomType, CitizenReport, ClimateSample, ClimateZone, Intensity, LatLng,
    Observation,
};
use crate::tables::{LookupTables, RegionSeed};

// ---

const UNKNOWN: &str = "Unknown";

/// The four in-memory collections, built once at startup.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordStore {
    pub observations: Vec<Observation>,
    pub citizen_reports: Vec<CitizenReport>,
    pub climate_samples: Vec<ClimateSample>,
    pub agricultural_fields: Vec<AgriculturalField>,
}

impl RecordStore {
    pub fn total(&self) -> usize {
        self.observations.len()
            + self.citizen_reports.len()
            + self.climate_samples.len()
            + self.agricultural_fields.len()
    }
}

/// Generate a store from the thread-local RNG.
pub fn generate(tables: &LookupTables, count: usize, year: i32) -> RecordStore {
    generate_with_rng(tables, count, year, &mut rand::thread_rng())
}

pub fn generate_with_rng<R: Rng + ?Sized>(
    tables: &LookupTables,
    count: usize,
    year: i32,
    rng: &mut R,
) -> RecordStore {
    // ---
    let mut store = RecordStore::default();

    for seed in &tables.regions {
        for _ in 0..count {
            store.observations.push(observation(tables, seed, year, rng));
            store.citizen_reports.push(citizen_report(tables, seed, year, rng));
            store.climate_samples.push(climate_sample(seed, rng));
            store.agricultural_fields.push(agricultural_field(tables, seed, year, rng));
        }
        tracing::debug!("Generated {} records per collection for {}", count, seed.name);
    }

    tracing::info!(
        "Generated {} observations, {} citizen reports, {} climate samples, {} fields",
        store.observations.len(),
        store.citizen_reports.len(),
        store.climate_samples.len(),
        store.agricultural_fields.len()
    );
    store
}

// ---

fn jitter<R: Rng + ?Sized>(seed: &RegionSeed, rng: &mut R) -> LatLng {
    let half = seed.radius.abs() / 2.0;
    LatLng::new(
        seed.center.lat + rng.gen_range(-half..=half),
        seed.center.lng + rng.gen_range(-half..=half),
    )
}

fn pick<R: Rng + ?Sized>(items: &[String], rng: &mut R) -> String {
    items
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn first_day(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn random_date<R: Rng + ?Sized>(year: i32, rng: &mut R) -> NaiveDate {
    // ---
    let start = first_day(year);
    let days = NaiveDate::from_ymd_opt(year, 12, 31).map_or(365, |d| u64::from(d.ordinal()));
    start
        .checked_add_days(Days::new(rng.gen_range(0..days)))
        .unwrap_or(start)
}

fn observation<R: Rng + ?Sized>(
    tables: &LookupTables,
    seed: &RegionSeed,
    year: i32,
    rng: &mut R,
) -> Observation {
    // ---
    let intensity = Intensity::ALL[rng.gen_range(0..Intensity::ALL.len())];
    let bloom_type = BloomType::ALL[rng.gen_range(0..BloomType::ALL.len())];

    Observation {
        id: Uuid::new_v4(),
        position: jitter(seed, rng),
        intensity,
        bloom_type,
        species: pick(tables.species_for(&seed.country), rng),
        confidence: rng.gen_range(0.6..1.0),
        date: random_date(year, rng),
        area_hectares: rng.gen_range(50.0..1000.0),
        country: seed.country.clone(),
        region: seed.name.clone(),
        climate_impact: metrics::climate_impact(tables, intensity, bloom_type),
        ecosystem_health: metrics::ecosystem_health(tables, intensity, bloom_type),
        agricultural_value: metrics::agricultural_value(tables, bloom_type, &seed.country),
    }
}

fn citizen_report<R: Rng + ?Sized>(
    tables: &LookupTables,
    seed: &RegionSeed,
    year: i32,
    rng: &mut R,
) -> CitizenReport {
    CitizenReport {
        id: Uuid::new_v4(),
        position: jitter(seed, rng),
        species: pick(tables.species_for(&seed.country), rng),
        date: random_date(year, rng),
        observer: format!("Observer_{}", rng.gen_range(1..=500)),
        validated: rng.gen_bool(0.7),
        country: seed.country.clone(),
    }
}

fn climate_sample<R: Rng + ?Sized>(seed: &RegionSeed, rng: &mut R) -> ClimateSample {
    // ---
    let position = jitter(seed, rng);
    ClimateSample {
        id: Uuid::new_v4(),
        position,
        temperature_c: rng.gen_range(15.0..40.0),
        precipitation_mm: rng.gen_range(0.0..200.0),
        humidity: rng.gen_range(30.0..90.0),
        wind_speed_kmh: rng.gen_range(0.0..25.0),
        pressure_hpa: rng.gen_range(980.0..1040.0),
        region: seed.name.clone(),
        climate_zone: ClimateZone::from_latitude(position.lat),
        bloom_correlation: rng.gen_range(0.0..1.0),
    }
}

fn agricultural_field<R: Rng + ?Sized>(
    tables: &LookupTables,
    seed: &RegionSeed,
    year: i32,
    rng: &mut R,
) -> AgriculturalField {
    // ---
    let crop = pick(tables.crops_for(&seed.country), rng);
    let planting_date = random_date(year, rng);
    let harvest_date = planting_date
        .checked_add_months(Months::new(tables.harvest_months(&crop)))
        .unwrap_or(planting_date);
    let half_season = (harvest_date - planting_date).num_days() / 2;
    let bloom_timing = planting_date
        .checked_add_days(Days::new(half_season.max(0) as u64))
        .unwrap_or(planting_date);
    let bloom_quality = rng.gen_range(0.0..1.0);
    let max_yield = tables.max_yield(&crop).max(2.0);

    AgriculturalField {
        id: Uuid::new_v4(),
        position: jitter(seed, rng),
        harvest_prediction: metrics::harvest_prediction(tables, &crop, bloom_quality),
        yield_estimate: rng.gen_range(2.0..=max_yield),
        soil_moisture: rng.gen_range(0.0..1.0),
        fertilizer_level: rng.gen_range(0.0..1.0),
        pest_pressure: rng.gen_range(0.0..1.0),
        country: seed.country.clone(),
        crop,
        planting_date,
        harvest_date,
        bloom_timing,
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn india_north_only() -> LookupTables {
        let mut tables = LookupTables::default();
        tables.regions.retain(|r| r.name == "India_North");
        tables
    }

    #[test]
    fn test_positions_stay_within_half_radius() {
        let tables = india_north_only();
        let store = generate(&tables, 20, 2024);

        assert_eq!(store.observations.len(), 20);
        for obs in &store.observations {
            assert!((obs.position.lat - 28.6139).abs() <= 1.5 + 1e-9, "lat {}", obs.position.lat);
            assert!((obs.position.lng - 77.2090).abs() <= 1.5 + 1e-9, "lng {}", obs.position.lng);
        }
        for report in &store.citizen_reports {
            assert!((report.position.lat - 28.6139).abs() <= 1.5 + 1e-9);
            assert!((report.position.lng - 77.2090).abs() <= 1.5 + 1e-9);
        }
    }

    #[test]
    fn test_every_collection_gets_count_per_region() {
        let tables = LookupTables::default();
        let store = generate(&tables, 7, 2024);
        let expected = tables.regions.len() * 7;

        assert_eq!(store.observations.len(), expected);
        assert_eq!(store.citizen_reports.len(), expected);
        assert_eq!(store.climate_samples.len(), expected);
        assert_eq!(store.agricultural_fields.len(), expected);
        assert_eq!(store.total(), expected * 4);
    }

    #[test]
    fn test_observation_invariants() {
        let tables = LookupTables::default();
        let store = generate(&tables, 20, 2024);

        for obs in &store.observations {
            assert!((0.6..1.0).contains(&obs.confidence), "confidence {}", obs.confidence);
            assert_eq!(obs.date.year(), 2024);
            assert!(tables.species_for(&obs.country).contains(&obs.species));

            // Derived fields reproduce from the categorical inputs
            let impact = metrics::climate_impact(&tables, obs.intensity, obs.bloom_type);
            let health = metrics::ecosystem_health(&tables, obs.intensity, obs.bloom_type);
            let value = metrics::agricultural_value(&tables, obs.bloom_type, &obs.country);
            assert_eq!(obs.climate_impact, impact);
            assert_eq!(obs.ecosystem_health, health);
            assert_eq!(obs.agricultural_value, value);
            for metric in [impact, health, value] {
                assert!(metric.is_finite() && metric >= 0.0);
            }
        }
    }

    #[test]
    fn test_field_dates_are_ordered() {
        let tables = LookupTables::default();
        let store = generate(&tables, 10, 2023);

        for field in &store.agricultural_fields {
            assert!(field.planting_date <= field.bloom_timing);
            assert!(field.bloom_timing <= field.harvest_date);
            assert!(field.harvest_date > field.planting_date);
            let base = tables.base_yield(&field.crop);
            assert!(field.harvest_prediction >= base * 0.8 - 1e-9);
            assert!(field.harvest_prediction <= base * 1.2 + 1e-9);
        }
    }

    #[test]
    fn test_climate_zone_follows_latitude() {
        let tables = LookupTables::default();
        let store = generate(&tables, 5, 2024);

        for sample in &store.climate_samples {
            assert_eq!(sample.climate_zone, ClimateZone::from_latitude(sample.position.lat));
            assert!((15.0..40.0).contains(&sample.temperature_c));
            assert!((980.0..1040.0).contains(&sample.pressure_hpa));
        }
    }

    #[test]
    fn test_empty_species_table_does_not_fail() {
        let mut tables = india_north_only();
        tables.species_by_country.clear();
        tables.default_species.clear();
        let store = generate(&tables, 3, 2024);
        assert!(store.observations.iter().all(|o| o.species == UNKNOWN));
    }
}
