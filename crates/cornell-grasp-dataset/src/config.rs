//! JSON-backed configuration for dataset generation.

use crate::DatasetError;
use cornell_grasp_core::{BorderMode, DrawOptions};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Geometric augmentation and label settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentationConfig {
    /// Side of the square output canvas in pixels.
    pub output_size: usize,
    /// Random rotation draws per source image.
    pub random_rotations: usize,
    /// Apply a random zoom after cropping.
    pub random_zoom: bool,
    /// Zoom factor range, sampled uniformly. Factors below 1 magnify.
    pub zoom_min: f64,
    pub zoom_max: f64,
    /// Ground-truth rectangles stored per sample.
    pub max_grasps: usize,
    /// Grasp widths are clipped to `[0, width_scale]` and divided by it.
    pub width_scale: f32,
    /// Fill policy for pixels rotated or zoomed in from outside the image.
    pub border: BorderMode,
    pub draw: DrawOptions,
}

impl Default for AugmentationConfig {
    fn default() -> Self {
        Self {
            output_size: 400,
            random_rotations: 20,
            random_zoom: true,
            zoom_min: 0.8,
            zoom_max: 1.0,
            max_grasps: 25,
            width_scale: 150.0,
            border: BorderMode::Symmetric,
            draw: DrawOptions::default(),
        }
    }
}

impl AugmentationConfig {
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.output_size == 0 {
            return Err(DatasetError::InvalidConfig(
                "output_size must be > 0".into(),
            ));
        }
        if !(self.zoom_min.is_finite() && self.zoom_max.is_finite())
            || self.zoom_min <= 0.0
            || self.zoom_min > self.zoom_max
        {
            return Err(DatasetError::InvalidConfig(format!(
                "zoom range must satisfy 0 < zoom_min <= zoom_max, got [{}, {}]",
                self.zoom_min, self.zoom_max
            )));
        }
        if !(self.width_scale.is_finite() && self.width_scale > 0.0) {
            return Err(DatasetError::InvalidConfig(
                "width_scale must be > 0".into(),
            ));
        }
        if !(self.draw.core_length_ratio > 0.0 && self.draw.core_length_ratio <= 1.0) {
            return Err(DatasetError::InvalidConfig(
                "draw.core_length_ratio must be in (0, 1]".into(),
            ));
        }
        Ok(())
    }
}

fn default_seed() -> u64 {
    5
}

/// Full configuration of a generation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Directory holding the raw `pcdXXXX*` files.
    pub dataset_dir: PathBuf,
    /// Directory receiving one record per draw.
    pub output_dir: PathBuf,
    #[serde(default)]
    pub augmentation: AugmentationConfig,
    /// Seed for the run's random generator.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Build samples but do not persist them.
    #[serde(default)]
    pub dry_run: bool,
}

impl GenerateConfig {
    pub fn new(dataset_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            dataset_dir: dataset_dir.into(),
            output_dir: output_dir.into(),
            augmentation: AugmentationConfig::default(),
            seed: default_seed(),
            dry_run: false,
        }
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DatasetError> {
        self.augmentation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_cornell_setup() {
        let cfg = GenerateConfig::new("raw", "out");
        assert_eq!(cfg.augmentation.output_size, 400);
        assert_eq!(cfg.augmentation.random_rotations, 20);
        assert_eq!(cfg.augmentation.max_grasps, 25);
        assert_eq!(cfg.seed, 5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: GenerateConfig = serde_json::from_str(
            r#"{"dataset_dir": "raw", "output_dir": "out", "augmentation": {"random_zoom": false}}"#,
        )
        .unwrap();
        assert!(!cfg.augmentation.random_zoom);
        assert_eq!(cfg.augmentation.output_size, 400);
        assert_eq!(cfg.seed, 5);
    }

    #[test]
    fn json_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generate.json");
        let mut cfg = GenerateConfig::new("raw", "out");
        cfg.augmentation.border = BorderMode::Constant(0.0);
        cfg.write_json(&path).unwrap();
        assert_eq!(GenerateConfig::load_json(&path).unwrap(), cfg);
    }

    #[test]
    fn rejects_bad_zoom_range() {
        let mut aug = AugmentationConfig::default();
        aug.zoom_min = 1.2;
        assert!(matches!(aug.validate(), Err(DatasetError::InvalidConfig(_))));
        aug.zoom_min = 0.0;
        assert!(aug.validate().is_err());
    }
}
