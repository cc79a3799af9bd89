//! Whole-dataset generation run.

use crate::augment::{augment, SourceImage};
use crate::config::{AugmentationConfig, GenerateConfig};
use crate::layout::DatasetLayout;
use crate::sink::SampleSink;
use crate::DatasetError;
use cornell_grasp_core::CapacityError;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Outcome of a generation run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Source images that produced their draws.
    pub images_processed: usize,
    pub samples_written: usize,
    /// Skipped source images with the reason.
    pub failed: Vec<(String, String)>,
}

/// Generate every draw of every scene under `cfg.dataset_dir` into `sink`.
///
/// A scene that fails to load or transform is logged and skipped; a sink
/// failure aborts the run.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(cfg, sink)))]
pub fn generate<S: SampleSink + ?Sized>(
    cfg: &GenerateConfig,
    sink: &mut S,
) -> Result<GenerationReport, DatasetError> {
    cfg.validate()?;
    let layout = DatasetLayout::new(&cfg.dataset_dir);
    let ids = layout.image_ids()?;
    info!(
        "found {} source images in {}",
        ids.len(),
        layout.root().display()
    );

    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let mut report = GenerationReport::default();
    for img_id in &ids {
        let source = match SourceImage::load(&layout, img_id) {
            Ok(source) => source,
            Err(e) => {
                warn!("skipping {img_id}: {e}");
                report.failed.push((img_id.clone(), e.to_string()));
                continue;
            }
        };
        process_source(&source, &cfg.augmentation, &mut rng, sink, &mut report)?;
    }

    info!(
        "processed {} images, wrote {} samples, skipped {}",
        report.images_processed,
        report.samples_written,
        report.failed.len()
    );
    Ok(report)
}

/// Run all draws of one loaded scene, numbering samples after those already
/// in `report`.
///
/// Draws of a scene that cannot be augmented are discarded and the scene is
/// recorded as failed. Only sink errors are returned.
pub fn process_source<R: Rng + ?Sized, S: SampleSink + ?Sized>(
    source: &SourceImage,
    cfg: &AugmentationConfig,
    rng: &mut R,
    sink: &mut S,
    report: &mut GenerationReport,
) -> Result<(), DatasetError> {
    if source.grasps.len() > cfg.max_grasps {
        let e = DatasetError::from(CapacityError {
            count: source.grasps.len(),
            capacity: cfg.max_grasps,
        });
        warn!("skipping {}: {e}", source.img_id);
        report.failed.push((source.img_id.clone(), e.to_string()));
        return Ok(());
    }

    let mut samples = Vec::with_capacity(cfg.random_rotations);
    for _ in 0..cfg.random_rotations {
        match augment(source, cfg, rng) {
            Ok(sample) => samples.push(sample),
            Err(e) => {
                warn!("skipping {}: {e}", source.img_id);
                report.failed.push((source.img_id.clone(), e.to_string()));
                return Ok(());
            }
        }
    }

    for sample in &samples {
        report.samples_written += 1;
        sink.write(report.samples_written, sample)?;
    }
    report.images_processed += 1;
    Ok(())
}
