//! Configuration loader for the `bloomscope` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};

/// Parse an optional environment variable into `$ty` with a default value.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// TCP port the HTTP surface listens on.
    pub port: u16,

    /// Records generated per region seed for each collection.
    pub records_per_region: usize,

    /// Calendar year all generated dates fall in.
    pub observation_year: i32,

    /// Search radius for map click lookups, in kilometres.
    pub nearest_radius_km: f64,

    /// Optional JSON file replacing the built-in lookup tables.
    pub lookup_tables_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            records_per_region: 20,
            observation_year: 2024,
            nearest_radius_km: 50.0,
            lookup_tables_path: None,
        }
    }
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `BLOOM_PORT` – listen port (default: 8080)
/// - `RECORDS_PER_REGION` – records per region seed (default: 20)
/// - `OBSERVATION_YEAR` – year of generated dates (default: 2024)
/// - `NEAREST_RADIUS_KM` – click lookup radius (default: 50)
/// - `LOOKUP_TABLES_PATH` – JSON lookup table override (default: built-in)
///
/// Returns an error if any variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let defaults = Config::default();
    let port = parse_env!("BLOOM_PORT", u16, defaults.port);
    let records_per_region = parse_env!("RECORDS_PER_REGION", usize, defaults.records_per_region);
    let observation_year = parse_env!("OBSERVATION_YEAR", i32, defaults.observation_year);
    let nearest_radius_km = parse_env!("NEAREST_RADIUS_KM", f64, defaults.nearest_radius_km);
    let lookup_tables_path = env::var("LOOKUP_TABLES_PATH").ok().map(PathBuf::from);

    let cfg = Config {
        port,
        records_per_region,
        observation_year,
        nearest_radius_km,
        lookup_tables_path,
    };
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    /// Reject values the generator or click lookup cannot work with.
    pub fn validate(&self) -> Result<()> {
        // ---
        if !(1900..=2100).contains(&self.observation_year) {
            bail!("OBSERVATION_YEAR must be between 1900 and 2100, got {}", self.observation_year);
        }
        if !self.nearest_radius_km.is_finite() || self.nearest_radius_km <= 0.0 {
            bail!("NEAREST_RADIUS_KM must be a positive number, got {}", self.nearest_radius_km);
        }
        Ok(())
    }

    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        let tables = self
            .lookup_tables_path
            .as_ref()
            .map_or_else(|| "<built-in>".to_string(), |p| p.display().to_string());

        tracing::info!("Configuration loaded:");
        tracing::info!("  BLOOM_PORT         : {}", self.port);
        tracing::info!("  RECORDS_PER_REGION : {}", self.records_per_region);
        tracing::info!("  OBSERVATION_YEAR   : {}", self.observation_year);
        tracing::info!("  NEAREST_RADIUS_KM  : {}", self.nearest_radius_km);
        tracing::info!("  LOOKUP_TABLES_PATH : {}", tables);
    }
}
