//! Network-facing encoding of a sample's label maps.

use crate::sample::{ChannelsFirst, DatasetSample};

/// Four single-channel `H x W` regression targets.
///
/// The angle is encoded as `cos(2θ)` and `sin(2θ)` so that `θ` and `θ + π`,
/// which describe the same grasp, share one target.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingTargets {
    pub position: ChannelsFirst<f32>,
    pub cos: ChannelsFirst<f32>,
    pub sin: ChannelsFirst<f32>,
    pub width: ChannelsFirst<f32>,
}

impl TrainingTargets {
    pub fn from_sample(sample: &DatasetSample) -> Self {
        let angle = &sample.angle_img;
        let map = |f: fn(f32) -> f32| ChannelsFirst {
            channels: angle.channels,
            height: angle.height,
            width: angle.width,
            data: angle.data.iter().map(|&a| f(2.0 * a)).collect(),
        };
        Self {
            position: sample.grasp_points_img.clone(),
            cos: map(f32::cos),
            sin: map(f32::sin),
            width: sample.grasp_width.clone(),
        }
    }
}
