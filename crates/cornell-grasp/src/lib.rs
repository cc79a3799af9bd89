//! High-level facade crate for the `cornell-grasp-*` workspace.
//!
//! This crate provides stable re-exports of the underlying crates and the
//! `cornell-grasp` command line tool (feature `cli`).
//!
//! ## Quickstart
//!
//! ```no_run
//! use cornell_grasp::dataset::{generate, GenerateConfig, JsonSampleSink};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = GenerateConfig::new("data/cornell", "data/samples");
//! let mut sink = JsonSampleSink::create(&cfg.output_dir)?;
//! let report = generate(&cfg, &mut sink)?;
//! println!("wrote {} samples", report.samples_written);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `cornell_grasp::core`: grasp rectangles, rasterization, images, depth maps.
//! - `cornell_grasp::dataset`: augmentation pipeline, samples and sinks.
//! - `cornell_grasp::eval`: peak detection and IoU grasp matching.

pub use cornell_grasp_core as core;
pub use cornell_grasp_dataset as dataset;
pub use cornell_grasp_eval as eval;

pub use cornell_grasp_core::{DepthImage, GraspPose, GraspRectangle, GraspRectangles, Image};
pub use cornell_grasp_dataset::{AugmentationConfig, DatasetSample, GenerateConfig};
pub use cornell_grasp_eval::{calculate_iou_matches, MatchOutcome, MatchParams};
