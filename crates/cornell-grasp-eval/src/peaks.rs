//! Local maxima of a single-channel quality map.

use cornell_grasp_core::Image;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakParams {
    /// Half-size of the maximum window and minimum spacing between peaks
    /// (Chebyshev distance, pixels).
    pub min_distance: usize,
    /// Peaks must be strictly above this value.
    pub threshold_abs: f32,
    /// Ignore pixels closer than `min_distance` to the image border.
    pub exclude_border: bool,
    /// Keep at most this many peaks.
    pub num_peaks: Option<usize>,
}

impl Default for PeakParams {
    fn default() -> Self {
        Self {
            min_distance: 20,
            threshold_abs: 0.2,
            exclude_border: true,
            num_peaks: None,
        }
    }
}

/// One local maximum, `(row, col)` and its value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub row: usize,
    pub col: usize,
    pub value: f32,
}

/// Local maxima of channel 0 of `map`, strongest first.
///
/// A pixel is a candidate when it exceeds `threshold_abs` and equals the
/// maximum of the `(2 * min_distance + 1)` window around it (clipped at the
/// border). Candidates are then accepted greedily by value, dropping any
/// within `min_distance` of an accepted peak, so plateaus yield one peak.
pub fn find_local_maxima(map: &Image, params: &PeakParams) -> Vec<Peak> {
    let (w, h) = (map.width, map.height);
    let d = params.min_distance;
    let margin = if params.exclude_border { d } else { 0 };
    if w <= 2 * margin || h <= 2 * margin {
        return Vec::new();
    }

    let value = |row: usize, col: usize| map.get(row, col, 0);
    let mut candidates = Vec::new();
    for row in margin..h - margin {
        for col in margin..w - margin {
            let v = value(row, col);
            if v.is_nan() || v <= params.threshold_abs {
                continue;
            }
            let is_max = (row.saturating_sub(d)..(row + d + 1).min(h)).all(|r| {
                (col.saturating_sub(d)..(col + d + 1).min(w)).all(|c| value(r, c) <= v)
            });
            if is_max {
                candidates.push(Peak { row, col, value: v });
            }
        }
    }

    // Stable sort keeps raster order among equal values.
    candidates.sort_by(|a, b| b.value.total_cmp(&a.value));

    let limit = params.num_peaks.unwrap_or(usize::MAX);
    let mut peaks: Vec<Peak> = Vec::new();
    for c in candidates {
        if peaks.len() >= limit {
            break;
        }
        let too_close = peaks
            .iter()
            .any(|p| p.row.abs_diff(c.row) <= d && p.col.abs_diff(c.col) <= d);
        if !too_close {
            peaks.push(c);
        }
    }
    peaks
}
