//! Destinations for generated samples.

use crate::sample::DatasetSample;
use crate::DatasetError;
use log::debug;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Receives samples in generation order.
pub trait SampleSink {
    /// Persist one sample under the 1-based global `index`.
    fn write(&mut self, index: usize, sample: &DatasetSample) -> Result<(), DatasetError>;
}

/// Writes each sample to `<output_dir>/<index>.json`.
#[derive(Clone, Debug)]
pub struct JsonSampleSink {
    output_dir: PathBuf,
}

impl JsonSampleSink {
    /// Create `output_dir` (and parents) if needed.
    pub fn create(output_dir: impl Into<PathBuf>) -> Result<Self, DatasetError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn sample_path(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("{index}.json"))
    }

    /// Read back a sample written by this sink.
    pub fn load(path: impl AsRef<Path>) -> Result<DatasetSample, DatasetError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl SampleSink for JsonSampleSink {
    fn write(&mut self, index: usize, sample: &DatasetSample) -> Result<(), DatasetError> {
        let path = self.sample_path(index);
        let json = serde_json::to_string(sample)?;
        fs::write(&path, json)?;
        debug!("wrote {}", path.display());
        Ok(())
    }
}

/// Discards samples. Used for dry runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl SampleSink for NullSink {
    fn write(&mut self, _index: usize, _sample: &DatasetSample) -> Result<(), DatasetError> {
        Ok(())
    }
}

/// Keeps samples in memory.
#[derive(Clone, Debug, Default)]
pub struct VecSink {
    pub samples: Vec<(usize, DatasetSample)>,
}

impl SampleSink for VecSink {
    fn write(&mut self, index: usize, sample: &DatasetSample) -> Result<(), DatasetError> {
        self.samples.push((index, sample.clone()));
        Ok(())
    }
}
