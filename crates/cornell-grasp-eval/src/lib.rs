//! Grasp detection metric for Cornell-style ground truth.
//!
//! Predicted grasps are read off the strongest local maxima of a position
//! map, sized from a width map (or a fixed width), and count as correct when
//! one of them overlaps a ground-truth rectangle with IoU above 0.25 while
//! its axis is within 30 degrees of that rectangle's.

mod error;
mod io;
mod matcher;
mod peaks;
mod polygon;

pub use error::EvalError;
pub use io::{PredictionSample, PredictionSet};
pub use matcher::{
    calculate_iou_matches, decode_angle, detect_grasps, sample_succeeds, MatchOutcome,
    MatchParams,
};
pub use peaks::{find_local_maxima, Peak, PeakParams};
pub use polygon::{convex_intersection, grasp_iou, polygon_area, rectangle_iou, signed_area};
