//! Success/failure counting of predicted grasp maps against ground truth.

use crate::peaks::{find_local_maxima, PeakParams};
use crate::polygon::grasp_iou;
use crate::EvalError;
use cornell_grasp_core::{GraspPose, GraspRectangle, GraspRectangles, Image};
use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_6;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchParams {
    /// Peaks taken from each position map, strongest first.
    pub num_grasps: usize,
    /// A match needs IoU strictly above this.
    pub iou_threshold: f64,
    /// A match needs the axes less than this many radians apart (modulo π).
    pub angle_threshold: f64,
    /// Predicted gripper width in pixels when no width map is given.
    pub default_width: f64,
    /// Width maps hold `width / width_scale`.
    pub width_scale: f64,
    pub peaks: PeakParams,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            num_grasps: 1,
            iou_threshold: 0.25,
            angle_threshold: FRAC_PI_6,
            default_width: 30.0,
            width_scale: 150.0,
            peaks: PeakParams::default(),
        }
    }
}

/// Sample indices split by whether any predicted grasp matched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub succeeded: Vec<usize>,
    pub failed: Vec<usize>,
}

impl MatchOutcome {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Fraction of successful samples, 0 for an empty outcome.
    pub fn success_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            n => self.succeeded.len() as f64 / n as f64,
        }
    }

    /// Append the next batch, shifting its indices past the samples already
    /// held.
    pub fn merge(&mut self, other: MatchOutcome) {
        let offset = self.total();
        self.succeeded
            .extend(other.succeeded.into_iter().map(|i| i + offset));
        self.failed.extend(other.failed.into_iter().map(|i| i + offset));
    }
}

/// Grasp angle from its `cos(2θ)` and `sin(2θ)` encoding.
#[inline]
pub fn decode_angle(cos2: f64, sin2: f64) -> f64 {
    sin2.atan2(cos2) * 0.5
}

/// Predicted grasps at the strongest peaks of `position`.
///
/// Length along the axis is twice the predicted width.
pub fn detect_grasps(
    position: &Image,
    angle: &Image,
    width: Option<&Image>,
    params: &MatchParams,
) -> Vec<GraspRectangle> {
    let peak_params = PeakParams {
        num_peaks: Some(params.num_grasps),
        ..params.peaks
    };
    find_local_maxima(position, &peak_params)
        .into_iter()
        .map(|p| {
            let w = width.map_or(params.default_width, |m| {
                m.get(p.row, p.col, 0) as f64 * params.width_scale
            });
            GraspPose {
                center: Point2::new(p.col as f64, p.row as f64),
                angle: angle.get(p.row, p.col, 0) as f64,
                length: 2.0 * w,
                width: w,
            }
            .to_rectangle()
        })
        .collect()
}

/// True when any predicted grasp matches any ground-truth rectangle.
pub fn sample_succeeds(
    predicted: &[GraspRectangle],
    ground_truth: &GraspRectangles,
    params: &MatchParams,
) -> bool {
    predicted.iter().any(|pred| {
        ground_truth
            .iter()
            .any(|gt| grasp_iou(pred, gt, params.angle_threshold) > params.iou_threshold)
    })
}

fn check_len(what: &'static str, got: usize, expected: usize) -> Result<(), EvalError> {
    if got != expected {
        return Err(EvalError::BatchMismatch {
            what,
            got,
            expected,
        });
    }
    Ok(())
}

fn check_map(
    index: usize,
    what: &'static str,
    map: &Image,
    shape: (usize, usize),
) -> Result<(), EvalError> {
    if map.channels != 1 || map.data.len() != map.width * map.height {
        return Err(EvalError::InvalidMap {
            index,
            what,
            expected: map.width * map.height,
        });
    }
    if (map.height, map.width) != shape {
        return Err(EvalError::MapShape {
            index,
            what,
            got: (map.height, map.width),
            expected: shape,
        });
    }
    Ok(())
}

/// Split sample indices by whether one of the `num_grasps` strongest
/// predicted grasps matches a ground-truth rectangle.
///
/// All slices are indexed by sample. Every map of a sample must share the
/// position map's size.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(batch = pred_positions.len()))
)]
pub fn calculate_iou_matches(
    pred_positions: &[Image],
    pred_angles: &[Image],
    ground_truth: &[GraspRectangles],
    params: &MatchParams,
    pred_widths: Option<&[Image]>,
) -> Result<MatchOutcome, EvalError> {
    let n = pred_positions.len();
    check_len("pred_angles", pred_angles.len(), n)?;
    check_len("ground_truth", ground_truth.len(), n)?;
    if let Some(widths) = pred_widths {
        check_len("pred_widths", widths.len(), n)?;
    }

    let mut outcome = MatchOutcome::default();
    for (i, (position, angle)) in pred_positions.iter().zip(pred_angles).enumerate() {
        let shape = (position.height, position.width);
        check_map(i, "position", position, shape)?;
        check_map(i, "angle", angle, shape)?;
        let width = pred_widths.map(|w| &w[i]);
        if let Some(w) = width {
            check_map(i, "width", w, shape)?;
        }

        let predicted = detect_grasps(position, angle, width, params);
        if sample_succeeds(&predicted, &ground_truth[i], params) {
            outcome.succeeded.push(i);
        } else {
            debug!(
                "sample {i}: no match among {} predictions and {} ground-truth grasps",
                predicted.len(),
                ground_truth[i].len()
            );
            outcome.failed.push(i);
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_3, PI};

    fn map(size: usize, fill: impl Fn(usize, usize) -> f32) -> Image {
        let mut img = Image::zeros(size, size, 1);
        for row in 0..size {
            for col in 0..size {
                img.set(row, col, 0, fill(row, col));
            }
        }
        img
    }

    fn single_peak(size: usize, row: usize, col: usize) -> Image {
        map(size, |r, c| if (r, c) == (row, col) { 1.0 } else { 0.0 })
    }

    fn gt_at(x: f64, y: f64, angle: f64) -> GraspRectangles {
        GraspRectangles::new(vec![GraspPose {
            center: Point2::new(x, y),
            angle,
            length: 60.0,
            width: 30.0,
        }
        .to_rectangle()])
    }

    #[test]
    fn decode_inverts_double_angle() {
        for theta in [-1.2_f64, -0.3, 0.0, 0.7, 1.5] {
            let (s, c) = (2.0 * theta).sin_cos();
            assert_relative_eq!(decode_angle(c, s), theta, epsilon = 1e-12);
        }
    }

    #[test]
    fn identical_grasp_matches() {
        let pos = single_peak(100, 50, 50);
        let ang = map(100, |_, _| 0.4);
        let outcome = calculate_iou_matches(
            &[pos],
            &[ang],
            &[gt_at(50.0, 50.0, 0.4)],
            &MatchParams::default(),
            None,
        )
        .unwrap();
        assert_eq!(
            outcome,
            MatchOutcome {
                succeeded: vec![0],
                failed: vec![]
            }
        );
        assert_relative_eq!(outcome.success_rate(), 1.0);
    }

    #[test]
    fn translated_grasp_fails() {
        let pos = single_peak(200, 50, 50);
        let ang = map(200, |_, _| 0.0);
        let outcome = calculate_iou_matches(
            &[pos],
            &[ang],
            &[gt_at(150.0, 50.0, 0.0)],
            &MatchParams::default(),
            None,
        )
        .unwrap();
        assert!(outcome.succeeded.is_empty());
        assert_eq!(outcome.failed, vec![0]);
    }

    #[test]
    fn half_turn_is_the_same_grasp_but_a_third_turn_is_not() {
        let params = MatchParams::default();
        let gt = gt_at(50.0, 50.0, 0.0);
        let ok = calculate_iou_matches(
            &[single_peak(100, 50, 50)],
            &[map(100, |_, _| PI as f32)],
            &[gt.clone()],
            &params,
            None,
        )
        .unwrap();
        assert_eq!(ok.succeeded, vec![0]);

        let off = calculate_iou_matches(
            &[single_peak(100, 50, 50)],
            &[map(100, |_, _| FRAC_PI_3 as f32)],
            &[gt],
            &params,
            None,
        )
        .unwrap();
        assert_eq!(off.failed, vec![0]);
    }

    #[test]
    fn width_map_sets_the_predicted_size() {
        let params = MatchParams::default();
        let width = map(100, |_, _| 0.2);
        let grasps = detect_grasps(
            &single_peak(100, 40, 60),
            &map(100, |_, _| 0.0),
            Some(&width),
            &params,
        );
        assert_eq!(grasps.len(), 1);
        let pose = grasps[0].pose();
        assert_relative_eq!(pose.center.x, 60.0, epsilon = 1e-9);
        assert_relative_eq!(pose.center.y, 40.0, epsilon = 1e-9);
        assert_relative_eq!(pose.width, 30.0, epsilon = 1e-4);
        assert_relative_eq!(pose.length, 60.0, epsilon = 1e-4);
    }

    #[test]
    fn mismatched_batches_are_errors() {
        let pos = single_peak(50, 25, 25);
        let err = calculate_iou_matches(
            &[pos.clone(), pos.clone()],
            &[pos.clone()],
            &[GraspRectangles::default(), GraspRectangles::default()],
            &MatchParams::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::BatchMismatch { what: "pred_angles", .. }));

        let small = single_peak(40, 20, 20);
        let err = calculate_iou_matches(
            &[pos],
            &[small],
            &[GraspRectangles::default()],
            &MatchParams::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::MapShape { what: "angle", .. }));
    }

    #[test]
    fn outcome_names_the_failing_samples() {
        let peak = single_peak(100, 50, 50);
        let ang = map(100, |_, _| 0.0);
        let outcome = calculate_iou_matches(
            &[peak.clone(), peak.clone(), peak],
            &[ang.clone(), ang.clone(), ang],
            &[
                gt_at(90.0, 10.0, 0.0),
                gt_at(50.0, 50.0, 0.0),
                gt_at(50.0, 50.0, 0.0),
            ],
            &MatchParams::default(),
            None,
        )
        .unwrap();
        assert_eq!(outcome.succeeded, vec![1, 2]);
        assert_eq!(outcome.failed, vec![0]);
        assert_eq!(outcome.total(), 3);
    }

    #[test]
    fn outcomes_merge() {
        let mut total = MatchOutcome {
            succeeded: vec![0, 1, 3],
            failed: vec![2],
        };
        total.merge(MatchOutcome {
            succeeded: vec![2],
            failed: vec![0, 1, 3],
        });
        assert_eq!(total.succeeded, vec![0, 1, 3, 6]);
        assert_eq!(total.failed, vec![2, 4, 5, 7]);
        assert_eq!(total.total(), 8);
        assert_relative_eq!(total.success_rate(), 0.5);
        assert_eq!(MatchOutcome::default().success_rate(), 0.0);
    }
}
