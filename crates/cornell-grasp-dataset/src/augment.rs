//! Per-draw geometric augmentation of one source image.
//!
//! A draw rotates the RGB image, the depth map and the grasp rectangles about
//! the grasp-collection center, crops a square window around that center,
//! optionally zooms about the window center, and rasterizes the labels. The
//! three inputs always receive the same transform so labels stay on their
//! pixels.

use crate::config::AugmentationConfig;
use crate::layout::{numeric_id, DatasetLayout};
use crate::sample::{ChannelsFirst, DatasetSample};
use crate::DatasetError;
use cornell_grasp_core::{DepthImage, GraspRectangles, Image};
use log::debug;
use nalgebra::{Point2, Vector2};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Inputs shared by every draw of one scene.
#[derive(Clone, Debug)]
pub struct SourceImage {
    pub img_id: String,
    pub rgb: Image,
    pub depth: DepthImage,
    pub grasps: GraspRectangles,
}

impl SourceImage {
    /// Bundle already-loaded inputs, checking that they fit together.
    pub fn new(
        img_id: impl Into<String>,
        rgb: Image,
        depth: DepthImage,
        grasps: GraspRectangles,
    ) -> Result<Self, DatasetError> {
        let img_id = img_id.into();
        if (rgb.width, rgb.height) != (depth.width, depth.height) {
            return Err(DatasetError::SizeMismatch {
                rgb: (rgb.width, rgb.height),
                depth: (depth.width, depth.height),
            });
        }
        if grasps.is_empty() {
            return Err(DatasetError::NoGrasps { img_id });
        }
        Ok(Self {
            img_id,
            rgb,
            depth,
            grasps,
        })
    }

    /// Read the RGB image, point cloud and positive grasps of `img_id`, and
    /// inpaint the depth map.
    ///
    /// The point cloud is projected onto the RGB image's pixel grid.
    pub fn load(layout: &DatasetLayout, img_id: &str) -> Result<Self, DatasetError> {
        let rgb = ::image::open(layout.rgb_path(img_id))?.to_rgb8();
        let rgb = Image::from_rgb8(&rgb);

        let mut depth = DepthImage::from_pcd(layout.pcd_path(img_id), rgb.width, rgb.height)?;
        let report = depth.inpaint();
        debug!(
            "{img_id}: inpainted {} depth pixels in {} passes",
            report.filled, report.iterations
        );

        let grasps = GraspRectangles::load_from_file(layout.pos_grasp_path(img_id))?;
        Self::new(img_id, rgb, depth, grasps)
    }

    /// Pivot of every draw: mean of the grasp centers.
    pub fn center(&self) -> Point2<f64> {
        self.grasps.center().unwrap_or_else(|| self.depth.center())
    }
}

/// Random parameters of one draw.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Augmentation {
    /// Rotation in radians, counter-clockwise on screen.
    pub angle: f64,
    /// Zoom factor, `None` when zoom is disabled.
    pub zoom: Option<f64>,
}

impl Augmentation {
    pub const IDENTITY: Augmentation = Augmentation {
        angle: 0.0,
        zoom: None,
    };

    /// Angle uniform in `[-π, π)`; zoom uniform in the configured range.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, cfg: &AugmentationConfig) -> Self {
        let angle = rng.gen_range(-PI..PI);
        let zoom = cfg
            .random_zoom
            .then(|| rng.gen_range(cfg.zoom_min..=cfg.zoom_max));
        Self { angle, zoom }
    }
}

/// Crop window of side `size` centered on `center`, shifted to stay inside a
/// `width x height` image. Returns `((top, left), (bottom, right))`, bottom
/// and right exclusive. When the image is smaller than `size` the window is
/// the whole image along that axis.
pub fn crop_window(
    center: Point2<f64>,
    width: usize,
    height: usize,
    size: usize,
) -> ((usize, usize), (usize, usize)) {
    let start = |c: f64, extent: usize| -> usize {
        let max_start = extent.saturating_sub(size) as i64;
        let wanted = c.round() as i64 - (size / 2) as i64;
        wanted.clamp(0, max_start) as usize
    };
    let top = start(center.y, height);
    let left = start(center.x, width);
    (
        (top, left),
        ((top + size).min(height), (left + size).min(width)),
    )
}

/// Draw random parameters from `rng` and apply them.
pub fn augment<R: Rng + ?Sized>(
    source: &SourceImage,
    cfg: &AugmentationConfig,
    rng: &mut R,
) -> Result<DatasetSample, DatasetError> {
    let aug = Augmentation::sample(rng, cfg);
    augment_with(source, cfg, aug)
}

/// Apply one draw to private copies of the source and build the sample.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(source, cfg), fields(img_id = %source.img_id))
)]
pub fn augment_with(
    source: &SourceImage,
    cfg: &AugmentationConfig,
    aug: Augmentation,
) -> Result<DatasetSample, DatasetError> {
    if let Some(factor) = aug.zoom {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(DatasetError::InvalidConfig(format!(
                "zoom factor must be positive and finite, got {factor}"
            )));
        }
    }
    let img_id = numeric_id(&source.img_id)?;
    let center = source.center();

    let mut rgb = source.rgb.clone();
    let mut depth = source.depth.clone();
    let mut grasps = source.grasps.clone();

    rgb.rotate(aug.angle, center, cfg.border);
    depth.rotate(aug.angle, center, cfg.border);
    grasps.rotate(aug.angle, center);

    let (top_left, bottom_right) = crop_window(center, rgb.width, rgb.height, cfg.output_size);
    rgb.crop(top_left, bottom_right)?;
    depth.crop(top_left, bottom_right)?;
    grasps.offset(Vector2::new(-(top_left.1 as f64), -(top_left.0 as f64)));

    if let Some(factor) = aug.zoom {
        rgb.zoom(factor, cfg.border);
        depth.zoom(factor, cfg.border);
        grasps.zoom(factor, depth.center());
    }

    depth.normalise();

    let maps = grasps.draw_with(depth.width, depth.height, &cfg.draw);
    let bounding_boxes = grasps.to_array(cfg.max_grasps)?;

    let scale = cfg.width_scale;
    let mut width_map = maps.width;
    for v in &mut width_map.data {
        *v = v.clamp(0.0, scale) / scale;
    }

    debug!(
        "{}: angle={:.3} zoom={:?} -> {} of {} grasps in frame",
        source.img_id,
        aug.angle,
        aug.zoom,
        grasps.in_bounds(depth.width, depth.height).count(),
        grasps.len()
    );

    Ok(DatasetSample {
        img_id,
        rgb: ChannelsFirst::from_image_u8(&rgb),
        depth_inpainted: ChannelsFirst::from_image(&depth),
        bounding_boxes,
        grasp_points_img: ChannelsFirst::from_image(&maps.position),
        angle_img: ChannelsFirst::from_image(&maps.angle),
        grasp_width: ChannelsFirst::from_image(&width_map),
    })
}
