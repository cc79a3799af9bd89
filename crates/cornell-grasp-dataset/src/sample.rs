//! Fixed-schema training record.

use cornell_grasp_core::{GraspRectangles, Image};
use serde::{Deserialize, Serialize};

/// Dense array laid out as `(channels, height, width)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelsFirst<T> {
    pub channels: usize,
    pub height: usize,
    pub width: usize,
    pub data: Vec<T>,
}

impl<T: Copy> ChannelsFirst<T> {
    #[inline]
    pub fn get(&self, channel: usize, row: usize, col: usize) -> T {
        self.data[(channel * self.height + row) * self.width + col]
    }

    /// One channel as a row-major plane.
    pub fn plane(&self, channel: usize) -> &[T] {
        let n = self.height * self.width;
        &self.data[channel * n..(channel + 1) * n]
    }
}

impl ChannelsFirst<f32> {
    pub fn from_image(img: &Image) -> Self {
        Self {
            channels: img.channels,
            height: img.height,
            width: img.width,
            data: img.to_channels_first(),
        }
    }
}

impl ChannelsFirst<u8> {
    pub fn from_image_u8(img: &Image) -> Self {
        Self {
            channels: img.channels,
            height: img.height,
            width: img.width,
            data: img.to_u8_channels_first(),
        }
    }
}

/// One augmentation draw of one source image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetSample {
    pub img_id: u32,
    /// `3 x H x W` RGB.
    pub rgb: ChannelsFirst<u8>,
    /// `1 x H x W` normalised depth.
    pub depth_inpainted: ChannelsFirst<f32>,
    /// Ground-truth corners `[row, col]`, zero-padded to a fixed count.
    pub bounding_boxes: Vec<[[f64; 2]; 4]>,
    /// `1 x H x W`, 1.0 on grasp cores.
    pub grasp_points_img: ChannelsFirst<f32>,
    /// `1 x H x W`, grasp angle in radians.
    pub angle_img: ChannelsFirst<f32>,
    /// `1 x H x W`, grasp width scaled to `[0, 1]`.
    pub grasp_width: ChannelsFirst<f32>,
}

impl DatasetSample {
    /// Non-padding ground-truth rectangles.
    pub fn grasps(&self) -> GraspRectangles {
        GraspRectangles::from_array(&self.bounding_boxes)
    }

    /// `(height, width)` of the sample's maps.
    pub fn size(&self) -> (usize, usize) {
        (self.grasp_points_img.height, self.grasp_points_img.width)
    }
}
