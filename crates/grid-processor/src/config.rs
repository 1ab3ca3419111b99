//! Configuration for the resampling service.

use grid_index::{CurvilinearIndexMode, IndexOptions, DEFAULT_MAX_LUT_PIXELS, DEFAULT_OVERSAMPLING};
use serde::{Deserialize, Serialize};

use crate::strategy::DataReadingStrategy;

/// Configuration for the resampling service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridProcessorConfig {
    /// Number of look-up tables kept in memory.
    pub lut_cache_entries: usize,

    /// Number of resampled tiles kept in memory.
    pub tile_cache_entries: usize,

    /// Look-up table pixels per mean source cell width.
    pub lut_oversampling: f64,

    /// Largest look-up table (in pixels) that will be built.
    pub max_lut_pixels: u64,

    /// How source values are fetched for a pixel map.
    pub reading_strategy: DataReadingStrategy,

    /// How curvilinear grids are indexed.
    pub curvilinear_index: CurvilinearIndexMode,

    /// Map output rows in parallel when the index allows it.
    pub parallel_mapping: bool,
}

impl Default for GridProcessorConfig {
    fn default() -> Self {
        Self {
            lut_cache_entries: 32,
            tile_cache_entries: 1024,
            lut_oversampling: DEFAULT_OVERSAMPLING,
            max_lut_pixels: DEFAULT_MAX_LUT_PIXELS,
            reading_strategy: DataReadingStrategy::default(),
            curvilinear_index: CurvilinearIndexMode::default(),
            parallel_mapping: true,
        }
    }
}

impl GridProcessorConfig {
    /// Load configuration from `RESAMPLE_*` environment variables.
    ///
    /// Unset or unparseable variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("RESAMPLE_LUT_CACHE_ENTRIES") {
            if let Ok(entries) = val.parse() {
                config.lut_cache_entries = entries;
            }
        }

        if let Some(val) = lookup("RESAMPLE_TILE_CACHE_ENTRIES") {
            if let Ok(entries) = val.parse() {
                config.tile_cache_entries = entries;
            }
        }

        if let Some(val) = lookup("RESAMPLE_LUT_OVERSAMPLING") {
            if let Ok(factor) = val.parse() {
                config.lut_oversampling = factor;
            }
        }

        if let Some(val) = lookup("RESAMPLE_MAX_LUT_PIXELS") {
            if let Ok(pixels) = val.parse() {
                config.max_lut_pixels = pixels;
            }
        }

        if let Some(val) = lookup("RESAMPLE_READING_STRATEGY") {
            config.reading_strategy = DataReadingStrategy::from_str(&val);
        }

        if let Some(val) = lookup("RESAMPLE_CURVILINEAR_INDEX") {
            if let Ok(mode) = val.parse() {
                config.curvilinear_index = mode;
            }
        }

        if let Some(val) = lookup("RESAMPLE_PARALLEL_MAPPING") {
            config.parallel_mapping = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.lut_cache_entries == 0 {
            return Err("lut_cache_entries must be > 0".to_string());
        }

        if self.tile_cache_entries == 0 {
            return Err("tile_cache_entries must be > 0".to_string());
        }

        if !(self.lut_oversampling.is_finite() && self.lut_oversampling > 0.0) {
            return Err("lut_oversampling must be a positive number".to_string());
        }

        if self.max_lut_pixels == 0 {
            return Err("max_lut_pixels must be > 0".to_string());
        }

        Ok(())
    }

    /// Index build parameters derived from this configuration.
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            curvilinear: self.curvilinear_index,
            oversampling: self.lut_oversampling,
            max_lut_pixels: self.max_lut_pixels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_is_valid() {
        assert!(GridProcessorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_lookup() {
        let env = vars(&[
            ("RESAMPLE_LUT_CACHE_ENTRIES", "8"),
            ("RESAMPLE_READING_STRATEGY", "pixel_by_pixel"),
            ("RESAMPLE_CURVILINEAR_INDEX", "local"),
            ("RESAMPLE_PARALLEL_MAPPING", "false"),
            ("RESAMPLE_LUT_OVERSAMPLING", "not-a-number"),
        ]);
        let config = GridProcessorConfig::from_lookup(|k| env.get(k).cloned());

        assert_eq!(config.lut_cache_entries, 8);
        assert_eq!(config.tile_cache_entries, 1024);
        assert_eq!(config.reading_strategy, DataReadingStrategy::PixelByPixel);
        assert_eq!(config.curvilinear_index, CurvilinearIndexMode::LocalSearch);
        assert!(!config.parallel_mapping);
        assert_eq!(config.lut_oversampling, DEFAULT_OVERSAMPLING);
    }

    #[test]
    fn test_validate_rejects() {
        let config = GridProcessorConfig {
            tile_cache_entries: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GridProcessorConfig {
            lut_oversampling: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let json = r#"{
            "lut_cache_entries": 4,
            "tile_cache_entries": 64,
            "lut_oversampling": 2.0,
            "max_lut_pixels": 1000000,
            "reading_strategy": "bounding_box",
            "curvilinear_index": "local_search",
            "parallel_mapping": false
        }"#;
        let config: GridProcessorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.reading_strategy, DataReadingStrategy::BoundingBox);
        assert_eq!(config.curvilinear_index, CurvilinearIndexMode::LocalSearch);

        let back: GridProcessorConfig =
            serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_index_options() {
        let config = GridProcessorConfig {
            lut_oversampling: 5.0,
            ..Default::default()
        };
        let options = config.index_options();
        assert_eq!(options.oversampling, 5.0);
        assert_eq!(options.curvilinear, CurvilinearIndexMode::LookupTable);
    }
}
