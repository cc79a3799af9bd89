//! Core types for Cornell grasp dataset processing.
//!
//! This crate is purely geometric: grasp rectangles, their rasterization into
//! label maps, an `f32` image with rotate/crop/zoom, and depth maps built from
//! the dataset's point-cloud files. Every transform uses the same pixel
//! convention (pixel `(row, col)` centered at `x = col`, `y = row`), so
//! applying one transform to an image and to its rectangles keeps them
//! aligned.

mod depth;
mod error;
pub mod geometry;
mod grasp;
mod grasps;
mod image;
mod logger;
pub mod raster;

pub use depth::{DepthImage, DepthValue, InpaintParams, InpaintReport, MISSING_DEPTH};
pub use error::{BoundsError, CapacityError, ImageError, ParseError};
pub use grasp::{GraspPose, GraspRectangle};
pub use grasps::{DrawOptions, GraspMaps, GraspRectangles};
pub use image::{BorderMode, Image};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{filter_directives, init_with_level, level_for_verbosity};
