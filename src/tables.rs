//! Lookup tables driving generation, derived metrics and styling.
//!
//! The tables are plain data: a built-in set ships with the binary and the
//! whole structure can be replaced from a JSON file named by
//! `LOOKUP_TABLES_PATH`. Fields missing from such a file keep their
//! built-in values.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::{BloomType, Intensity, LatLng};

// ---

pub const DEFAULT_MULTIPLIER: f64 = 1.0;
pub const DEFAULT_BASE_YIELD: f64 = 5.0;
pub const DEFAULT_HARVEST_MONTHS: u32 = 6;
pub const DEFAULT_MAX_YIELD: f64 = 8.0;
pub const DEFAULT_CROP_COLOR: &str = "#8B4513";
pub const GLOBAL_REGION: &str = "global";

/// A seed area around which records are scattered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionSeed {
    pub name: String,
    pub center: LatLng,
    /// Full jitter width in degrees; positions land within `radius / 2`.
    pub radius: f64,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropProfile {
    /// Baseline yield in tonnes per hectare.
    pub base_yield: f64,
    pub harvest_months: u32,
    pub max_yield: f64,
    pub color: String,
}

/// Map viewport and country set selected by the region control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionViewport {
    pub center: LatLng,
    pub zoom: u8,
    /// Countries shown for this region. Empty means every country.
    #[serde(default)]
    pub countries: Vec<String>,
}

impl RegionViewport {
    pub fn includes(&self, country: &str) -> bool {
        self.countries.is_empty() || self.countries.iter().any(|c| c == country)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupTables {
    // ---
    pub regions: Vec<RegionSeed>,
    pub species_by_country: HashMap<String, Vec<String>>,
    pub default_species: Vec<String>,
    pub crops_by_country: HashMap<String, Vec<String>>,
    pub default_crops: Vec<String>,
    pub crops: HashMap<String, CropProfile>,
    pub impact_score: HashMap<Intensity, f64>,
    pub impact_type_multiplier: HashMap<BloomType, f64>,
    pub health_score: HashMap<Intensity, f64>,
    pub health_type_multiplier: HashMap<BloomType, f64>,
    pub type_value: HashMap<BloomType, f64>,
    pub country_multiplier: HashMap<String, f64>,
    pub intensity_colors: HashMap<Intensity, String>,
    pub viewports: BTreeMap<String, RegionViewport>,
}

impl LookupTables {
    /// Read a full or partial table set from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        // ---
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lookup tables from {}", path.display()))?;
        let tables: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid lookup tables in {}", path.display()))?;
        tables
            .validate()
            .with_context(|| format!("Rejected lookup tables in {}", path.display()))?;
        Ok(tables)
    }

    /// Reject values that would make derived metrics, yields or jitter
    /// negative or non-finite.
    pub fn validate(&self) -> Result<()> {
        // ---
        let scores = [
            ("impact_score", self.impact_score.values().collect::<Vec<_>>()),
            ("health_score", self.health_score.values().collect()),
            ("impact_type_multiplier", self.impact_type_multiplier.values().collect()),
            ("health_type_multiplier", self.health_type_multiplier.values().collect()),
            ("type_value", self.type_value.values().collect()),
            ("country_multiplier", self.country_multiplier.values().collect()),
        ];
        for (table, values) in scores {
            if let Some(bad) = values.into_iter().find(|v| !non_negative(**v)) {
                bail!("{} contains {}", table, bad);
            }
        }
        for (name, crop) in &self.crops {
            if !non_negative(crop.base_yield) || !non_negative(crop.max_yield) {
                bail!(
                    "crop {} has base_yield {} and max_yield {}",
                    name,
                    crop.base_yield,
                    crop.max_yield
                );
            }
        }
        for seed in &self.regions {
            if !non_negative(seed.radius) {
                bail!("region {} has radius {}", seed.name, seed.radius);
            }
        }
        Ok(())
    }

    /// Load the override file if one is configured, falling back to the
    /// built-in tables when it cannot be read.
    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        // ---
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(tables) => {
                tracing::info!("Loaded lookup tables from {}", path.display());
                tables
            }
            Err(e) => {
                tracing::error!("{:#}; using built-in lookup tables", e);
                Self::default()
            }
        }
    }

    pub fn species_for(&self, country: &str) -> &[String] {
        self.species_by_country
            .get(country)
            .map(Vec::as_slice)
            .unwrap_or(&self.default_species)
    }

    pub fn crops_for(&self, country: &str) -> &[String] {
        self.crops_by_country
            .get(country)
            .map(Vec::as_slice)
            .unwrap_or(&self.default_crops)
    }

    pub fn base_yield(&self, crop: &str) -> f64 {
        self.crops.get(crop).map_or(DEFAULT_BASE_YIELD, |c| c.base_yield)
    }

    pub fn harvest_months(&self, crop: &str) -> u32 {
        self.crops
            .get(crop)
            .map_or(DEFAULT_HARVEST_MONTHS, |c| c.harvest_months)
    }

    pub fn max_yield(&self, crop: &str) -> f64 {
        self.crops.get(crop).map_or(DEFAULT_MAX_YIELD, |c| c.max_yield)
    }

    pub fn crop_color(&self, crop: &str) -> &str {
        self.crops
            .get(crop)
            .map_or(DEFAULT_CROP_COLOR, |c| c.color.as_str())
    }

    pub fn intensity_color(&self, intensity: Intensity) -> &str {
        self.intensity_colors
            .get(&intensity)
            .map_or("#90EE90", String::as_str)
    }

    /// Viewport for a region key; unknown keys resolve to the global view.
    pub fn viewport(&self, region: &str) -> RegionViewport {
        // ---
        self.viewports
            .get(region)
            .or_else(|| self.viewports.get(GLOBAL_REGION))
            .cloned()
            .unwrap_or(RegionViewport {
                center: LatLng::new(20.0, 0.0),
                zoom: 2,
                countries: Vec::new(),
            })
    }
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn region(name: &str, lat: f64, lng: f64, radius: f64, country: &str) -> RegionSeed {
    RegionSeed {
        name: name.to_string(),
        center: LatLng::new(lat, lng),
        radius,
        country: country.to_string(),
    }
}

fn crop(base_yield: f64, harvest_months: u32, max_yield: f64, color: &str) -> CropProfile {
    CropProfile {
        base_yield,
        harvest_months,
        max_yield,
        color: color.to_string(),
    }
}

fn viewport(lat: f64, lng: f64, zoom: u8, countries: &[&str]) -> RegionViewport {
    RegionViewport {
        center: LatLng::new(lat, lng),
        zoom,
        countries: strings(countries),
    }
}

impl Default for LookupTables {
    fn default() -> Self {
        // ---
        let regions = vec![
            region("India_North", 28.6139, 77.2090, 3.0, "India"),
            region("India_South", 12.9716, 77.5946, 3.0, "India"),
            region("USA_California", 36.7783, -119.4179, 4.0, "USA"),
            region("USA_Texas", 31.9686, -99.9018, 4.0, "USA"),
            region("Brazil_South", -23.5505, -46.6333, 3.0, "Brazil"),
            region("China_East", 31.2304, 121.4737, 3.0, "China"),
            region("Kenya_Central", -1.2921, 36.8219, 2.0, "Kenya"),
            region("Netherlands", 52.1326, 5.2913, 1.5, "Netherlands"),
            region("Japan_Kanto", 35.6762, 139.6503, 2.0, "Japan"),
            region("Australia_East", -33.8688, 151.2093, 3.0, "Australia"),
        ];

        let species_by_country = HashMap::from([
            ("India".to_string(), strings(&["Lotus", "Marigold", "Jasmine", "Mustard"])),
            (
                "USA".to_string(),
                strings(&["California Poppy", "Bluebonnet", "Lupine", "Desert Lily"]),
            ),
            ("Brazil".to_string(), strings(&["Ipe", "Passion Flower", "Orchid", "Bromeliad"])),
            (
                "China".to_string(),
                strings(&["Peony", "Rapeseed", "Plum Blossom", "Chrysanthemum"]),
            ),
            (
                "Kenya".to_string(),
                strings(&["Jacaranda", "Protea", "Bougainvillea", "Desert Rose"]),
            ),
            ("Netherlands".to_string(), strings(&["Tulip", "Hyacinth", "Daffodil", "Crocus"])),
            (
                "Japan".to_string(),
                strings(&["Cherry Blossom", "Wisteria", "Azalea", "Hydrangea"]),
            ),
            (
                "Australia".to_string(),
                strings(&["Wattle", "Waratah", "Kangaroo Paw", "Flannel Flower"]),
            ),
        ]);

        let crops_by_country = HashMap::from([
            ("India".to_string(), strings(&["Rice", "Wheat", "Cotton", "Mustard"])),
            ("USA".to_string(), strings(&["Corn", "Soybean", "Almond", "Wheat"])),
            ("Brazil".to_string(), strings(&["Soybean", "Coffee", "Sugarcane", "Corn"])),
            ("China".to_string(), strings(&["Rice", "Rapeseed", "Wheat", "Tea"])),
            ("Kenya".to_string(), strings(&["Tea", "Coffee", "Corn"])),
            ("Netherlands".to_string(), strings(&["Tulip Bulbs", "Potato", "Wheat"])),
            ("Japan".to_string(), strings(&["Rice", "Tea", "Soybean"])),
            ("Australia".to_string(), strings(&["Wheat", "Canola", "Cotton"])),
        ]);

        let crops = HashMap::from([
            ("Rice".to_string(), crop(4.0, 4, 6.0, "#F5DEB3")),
            ("Wheat".to_string(), crop(3.5, 5, 5.5, "#DAA520")),
            ("Corn".to_string(), crop(6.0, 4, 9.0, "#FFD700")),
            ("Soybean".to_string(), crop(3.0, 4, 4.5, "#9ACD32")),
            ("Cotton".to_string(), crop(2.5, 6, 4.0, "#FFFAF0")),
            ("Mustard".to_string(), crop(1.5, 4, 2.5, "#FFDB58")),
            ("Almond".to_string(), crop(2.0, 7, 3.5, "#EFDECD")),
            ("Coffee".to_string(), crop(1.8, 9, 3.0, "#6F4E37")),
            ("Sugarcane".to_string(), crop(70.0, 12, 90.0, "#7CFC00")),
            ("Rapeseed".to_string(), crop(2.2, 5, 3.5, "#E4D00A")),
            ("Tea".to_string(), crop(2.4, 3, 4.0, "#228B22")),
            ("Tulip Bulbs".to_string(), crop(12.0, 8, 18.0, "#FF69B4")),
            ("Potato".to_string(), crop(40.0, 4, 55.0, "#C2B280")),
            ("Canola".to_string(), crop(2.0, 5, 3.2, "#FFEF00")),
        ]);

        let impact_score = HashMap::from([
            (Intensity::Low, 0.2),
            (Intensity::Moderate, 0.5),
            (Intensity::High, 0.8),
            (Intensity::Extreme, 1.0),
        ]);
        let impact_type_multiplier = HashMap::from([
            (BloomType::Superbloom, 1.5),
            (BloomType::Wildflower, 1.0),
            (BloomType::Agricultural, 1.2),
            (BloomType::Urban, 0.8),
        ]);
        let health_score = HashMap::from([
            (Intensity::Low, 0.3),
            (Intensity::Moderate, 0.6),
            (Intensity::High, 0.85),
            (Intensity::Extreme, 0.95),
        ]);
        let health_type_multiplier = HashMap::from([
            (BloomType::Superbloom, 1.2),
            (BloomType::Wildflower, 1.1),
            (BloomType::Agricultural, 0.9),
            (BloomType::Urban, 0.7),
        ]);
        let type_value = HashMap::from([
            (BloomType::Superbloom, 0.3),
            (BloomType::Wildflower, 0.2),
            (BloomType::Agricultural, 1.0),
            (BloomType::Urban, 0.1),
        ]);
        let country_multiplier = HashMap::from([
            ("India".to_string(), 1.2),
            ("USA".to_string(), 1.1),
            ("Brazil".to_string(), 1.15),
            ("China".to_string(), 1.1),
            ("Kenya".to_string(), 1.05),
            ("Netherlands".to_string(), 1.3),
            ("Australia".to_string(), 0.95),
        ]);
        let intensity_colors = HashMap::from([
            (Intensity::Low, "#90EE90".to_string()),
            (Intensity::Moderate, "#FFD700".to_string()),
            (Intensity::High, "#FF8C00".to_string()),
            (Intensity::Extreme, "#FF4500".to_string()),
        ]);

        let viewports = BTreeMap::from([
            (GLOBAL_REGION.to_string(), viewport(20.0, 0.0, 2, &[])),
            ("asia".to_string(), viewport(30.0, 100.0, 3, &["India", "China", "Japan"])),
            ("north_america".to_string(), viewport(40.0, -100.0, 4, &["USA"])),
            ("south_america".to_string(), viewport(-15.0, -60.0, 3, &["Brazil"])),
            ("africa".to_string(), viewport(0.0, 20.0, 3, &["Kenya"])),
            ("europe".to_string(), viewport(50.0, 10.0, 4, &["Netherlands"])),
            ("oceania".to_string(), viewport(-25.0, 135.0, 4, &["Australia"])),
        ]);

        Self {
            regions,
            species_by_country,
            default_species: strings(&["Wildflower", "Sunflower", "Clover"]),
            crops_by_country,
            default_crops: strings(&["Wheat", "Corn"]),
            crops,
            impact_score,
            impact_type_multiplier,
            health_score,
            health_type_multiplier,
            type_value,
            country_multiplier,
            intensity_colors,
            viewports,
        }
    }
}
