//! JSON prediction files.

use crate::matcher::{calculate_iou_matches, MatchOutcome, MatchParams};
use crate::EvalError;
use cornell_grasp_core::{GraspRectangles, Image};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Network output for one sample, with its padded ground truth.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionSample {
    pub position: Image,
    /// Grasp angle in radians per pixel.
    pub angle: Image,
    /// Width as a fraction of `MatchParams::width_scale`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Image>,
    /// Ground-truth corners `[row, col]`, zero rows are padding.
    pub ground_truth: Vec<[[f64; 2]; 4]>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionSet {
    pub samples: Vec<PredictionSample>,
}

impl PredictionSet {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, EvalError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| EvalError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), EvalError> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Match every sample. Width maps are used only when every sample has
    /// one.
    pub fn evaluate(&self, params: &MatchParams) -> Result<MatchOutcome, EvalError> {
        let positions: Vec<Image> = self.samples.iter().map(|s| s.position.clone()).collect();
        let angles: Vec<Image> = self.samples.iter().map(|s| s.angle.clone()).collect();
        let ground_truth: Vec<GraspRectangles> = self
            .samples
            .iter()
            .map(|s| GraspRectangles::from_array(&s.ground_truth))
            .collect();
        let widths: Option<Vec<Image>> = self.samples.iter().map(|s| s.width.clone()).collect();

        calculate_iou_matches(
            &positions,
            &angles,
            &ground_truth,
            params,
            widths.as_deref(),
        )
    }
}
