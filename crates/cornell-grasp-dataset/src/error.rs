use cornell_grasp_core::{BoundsError, CapacityError, ImageError, ParseError};

/// Errors produced while turning one source image into samples.
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Bounds(#[from] BoundsError),
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    #[error(transparent)]
    ImageBuffer(#[from] ImageError),
    #[error(transparent)]
    Decode(#[from] ::image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
    #[error("image id {0:?} is not a number")]
    InvalidImageId(String),
    #[error("image {img_id} has no positive grasps")]
    NoGrasps { img_id: String },
    #[error("rgb image is {rgb:?} (w, h) but depth map is {depth:?}")]
    SizeMismatch {
        rgb: (usize, usize),
        depth: (usize, usize),
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
