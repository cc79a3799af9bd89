//! Cornell grasp dataset generation.
//!
//! Current focus:
//! - discovery of scenes in the raw dataset directory,
//! - seeded rotate/crop/zoom augmentation of RGB, depth and grasp rectangles,
//! - fixed-schema samples streamed to a [`SampleSink`],
//! - network-facing target encoding and image-wise k-fold splits.
//!
//! Geometry, rasterization and depth handling live in `cornell-grasp-core`.

mod augment;
mod config;
mod error;
mod layout;
mod pipeline;
mod sample;
mod sink;
mod split;
mod targets;

pub use augment::{augment, augment_with, crop_window, Augmentation, SourceImage};
pub use config::{AugmentationConfig, GenerateConfig};
pub use error::DatasetError;
pub use layout::{numeric_id, DatasetLayout};
pub use pipeline::{generate, process_source, GenerationReport};
pub use sample::{ChannelsFirst, DatasetSample};
pub use sink::{JsonSampleSink, NullSink, SampleSink, VecSink};
pub use split::kfold_split;
pub use targets::TrainingTargets;
