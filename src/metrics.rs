//! Derived-metric calculator.
//!
//! Pure functions over the lookup tables. Table misses fall back to
//! [`DEFAULT_MULTIPLIER`] or the crop defaults in `tables`.

use crate::models::{BloomType, Intensity};
use crate::tables::{LookupTables, DEFAULT_MULTIPLIER};

// ---

pub fn climate_impact(tables: &LookupTables, intensity: Intensity, bloom_type: BloomType) -> f64 {
    let score = tables.impact_score.get(&intensity).copied().unwrap_or(DEFAULT_MULTIPLIER);
    let multiplier = tables
        .impact_type_multiplier
        .get(&bloom_type)
        .copied()
        .unwrap_or(DEFAULT_MULTIPLIER);
    score * multiplier
}

pub fn ecosystem_health(tables: &LookupTables, intensity: Intensity, bloom_type: BloomType) -> f64 {
    let score = tables.health_score.get(&intensity).copied().unwrap_or(DEFAULT_MULTIPLIER);
    let multiplier = tables
        .health_type_multiplier
        .get(&bloom_type)
        .copied()
        .unwrap_or(DEFAULT_MULTIPLIER);
    score * multiplier
}

pub fn agricultural_value(tables: &LookupTables, bloom_type: BloomType, country: &str) -> f64 {
    let value = tables.type_value.get(&bloom_type).copied().unwrap_or(DEFAULT_MULTIPLIER);
    let multiplier = tables
        .country_multiplier
        .get(country)
        .copied()
        .unwrap_or(DEFAULT_MULTIPLIER);
    value * multiplier
}

/// Predicted harvest in t/ha. `bloom_quality` is expected in [0, 1] and
/// scales the crop baseline between 80% and 120%.
pub fn harvest_prediction(tables: &LookupTables, crop: &str, bloom_quality: f64) -> f64 {
    tables.base_yield(crop) * (0.8 + bloom_quality * 0.4)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::tables::DEFAULT_BASE_YIELD;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "expected {b}, got {a}");
    }

    #[test]
    fn test_rice_harvest_prediction() {
        let tables = LookupTables::default();
        assert_close(harvest_prediction(&tables, "Rice", 1.0), 4.8);
        assert_close(harvest_prediction(&tables, "Rice", 0.0), 3.2);
        assert_close(harvest_prediction(&tables, "Rice", 1.0), tables.base_yield("Rice") * 1.2);
    }

    #[test]
    fn test_unknown_crop_uses_default_baseline() {
        let tables = LookupTables::default();
        assert_close(harvest_prediction(&tables, "Quinoa", 0.5), DEFAULT_BASE_YIELD);
    }

    #[test]
    fn test_climate_and_health_products() {
        let tables = LookupTables::default();
        assert_close(climate_impact(&tables, Intensity::Extreme, BloomType::Superbloom), 1.5);
        assert_close(climate_impact(&tables, Intensity::Low, BloomType::Urban), 0.16);
        assert_close(ecosystem_health(&tables, Intensity::High, BloomType::Wildflower), 0.935);
    }

    #[test]
    fn test_agricultural_value_country_fallback() {
        let tables = LookupTables::default();
        assert_close(agricultural_value(&tables, BloomType::Agricultural, "India"), 1.2);
        assert_close(agricultural_value(&tables, BloomType::Agricultural, "Atlantis"), 1.0);
    }

    #[test]
    fn test_missing_table_entry_uses_default_multiplier() {
        let mut tables = LookupTables::default();
        tables.impact_type_multiplier.remove(&BloomType::Urban);
        assert_close(climate_impact(&tables, Intensity::Moderate, BloomType::Urban), 0.5);
    }

    #[test]
    fn test_metrics_are_pure() {
        let tables = LookupTables::default();
        for intensity in Intensity::ALL {
            for bloom_type in BloomType::ALL {
                let a = climate_impact(&tables, intensity, bloom_type);
                let b = climate_impact(&tables, intensity, bloom_type);
                assert_eq!(a, b);
                assert!(a.is_finite() && a >= 0.0);
                assert!(ecosystem_health(&tables, intensity, bloom_type) >= 0.0);
            }
        }
    }
}
