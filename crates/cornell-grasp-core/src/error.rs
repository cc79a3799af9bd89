use std::path::PathBuf;

/// A grasp or point-cloud file could not be read.
///
/// Malformed records inside a readable file are skipped by the parsers and
/// never surface as this error.
#[derive(thiserror::Error, Debug)]
#[error("failed to read {}: {source}", path.display())]
pub struct ParseError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// A crop window that does not fit inside the image.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error(
    "crop window rows {top}..{bottom}, cols {left}..{right} is outside a {height}x{width} image"
)]
pub struct BoundsError {
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
    pub height: usize,
    pub width: usize,
}

/// More grasp rectangles than the fixed padding capacity.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{count} grasp rectangles exceed the padding capacity of {capacity}")]
pub struct CapacityError {
    pub count: usize,
    pub capacity: usize,
}

/// Shape or channel mismatches when converting image buffers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid image buffer length (expected {expected} values, got {got})")]
    InvalidBuffer { expected: usize, got: usize },
    #[error("expected {expected} channels, image has {got}")]
    ChannelMismatch { expected: usize, got: usize },
    #[error("invalid image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },
}
