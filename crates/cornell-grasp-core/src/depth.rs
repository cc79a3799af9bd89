//! Depth maps reconstructed from Cornell point-cloud text files.

use crate::error::ParseError;
use crate::image::Image;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use std::{fs, path::Path};

/// Pixels with this value carry no depth measurement.
pub const MISSING_DEPTH: f32 = 0.0;

const HEADER_SENTINEL: &str = "DATA";
const MM_PER_M: f64 = 1000.0;

/// Which quantity of a point-cloud row ends up in the depth map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthValue {
    /// Euclidean distance of the point from the sensor.
    #[default]
    Range,
    /// One raw column of the row (0 = x, 1 = y, 2 = z).
    Field(usize),
}

/// Bounds for [`DepthImage::inpaint_with`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InpaintParams {
    /// Maximum number of dilation passes.
    pub max_iterations: usize,
    /// Diffusion sweeps over the filled pixels after the holes are closed.
    pub smoothing_iterations: usize,
}

impl Default for InpaintParams {
    fn default() -> Self {
        Self {
            max_iterations: 512,
            smoothing_iterations: 8,
        }
    }
}

/// Outcome of a hole-filling run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InpaintReport {
    /// Pixels that received a value.
    pub filled: usize,
    /// Pixels still missing after the iteration bound.
    pub remaining: usize,
    /// Dilation passes performed.
    pub iterations: usize,
}

impl InpaintReport {
    pub fn converged(&self) -> bool {
        self.remaining == 0
    }
}

/// Single-channel depth map in metres.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthImage {
    image: Image,
}

impl DepthImage {
    pub fn new(image: Image) -> Self {
        debug_assert_eq!(image.channels, 1, "depth images are single channel");
        Self { image }
    }

    pub fn zeros(width: usize, height: usize) -> Self {
        Self::new(Image::zeros(width, height, 1))
    }

    /// Load a Cornell `pcdXXXX.txt` point cloud into a `width x height` map.
    pub fn from_pcd(path: impl AsRef<Path>, width: usize, height: usize) -> Result<Self, ParseError> {
        Self::from_pcd_with(path, width, height, DepthValue::Range)
    }

    pub fn from_pcd_with(
        path: impl AsRef<Path>,
        width: usize,
        height: usize,
        value: DepthValue,
    ) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse_pcd_str(&text, width, height, value))
    }

    /// Build a depth map from point-cloud text.
    ///
    /// Lines up to and including the `DATA` header line are skipped. Each
    /// following line holds `x y z` and optionally `rgb index`; the index
    /// column, when present, is the row-major pixel index, otherwise the
    /// point's position in the data section is used. Values are converted
    /// from millimetres to metres. Malformed rows and indices outside the map
    /// are skipped.
    pub fn parse_pcd_str(text: &str, width: usize, height: usize, value: DepthValue) -> Self {
        let mut depth = Self::zeros(width, height);
        let capacity = width * height;
        let mut in_data = false;
        let mut ordinal = 0usize;
        let mut written = 0usize;
        let mut skipped = 0usize;

        for line in text.lines() {
            let line = line.trim();
            if !in_data {
                in_data = line.starts_with(HEADER_SENTINEL);
                continue;
            }
            if line.is_empty() {
                continue;
            }
            let slot = ordinal;
            ordinal += 1;

            let fields: Vec<&str> = line.split_whitespace().collect();
            let Some((index, v)) = parse_point_row(&fields, slot, value) else {
                skipped += 1;
                continue;
            };
            if index >= capacity || !v.is_finite() {
                skipped += 1;
                continue;
            }
            depth.image.data[index] = (v / MM_PER_M) as f32;
            written += 1;
        }

        if !in_data {
            warn!("point cloud has no {HEADER_SENTINEL} line; depth map left empty");
        }
        debug!("point cloud: {written} points written, {skipped} rows skipped");
        depth
    }

    /// Number of pixels without a depth value.
    pub fn missing_count(&self) -> usize {
        self.image.data.iter().filter(|&&v| is_missing(v)).count()
    }

    pub fn inpaint(&mut self) -> InpaintReport {
        self.inpaint_with(&InpaintParams::default())
    }

    /// Fill missing pixels from their neighbours.
    ///
    /// Holes are closed from the outside in: each pass assigns every missing
    /// pixel that touches a valid 8-neighbour the mean of those neighbours.
    /// The filled pixels are then relaxed with a few diffusion sweeps while
    /// measured pixels stay fixed. If the pass bound is hit (or the map has
    /// no valid pixel at all) the remaining holes keep [`MISSING_DEPTH`].
    pub fn inpaint_with(&mut self, params: &InpaintParams) -> InpaintReport {
        let w = self.image.width;
        let h = self.image.height;
        let data = &mut self.image.data;

        let mut valid: Vec<bool> = data.iter().map(|&v| !is_missing(v)).collect();
        let holes: Vec<usize> = (0..data.len()).filter(|&i| !valid[i]).collect();
        for &i in &holes {
            data[i] = MISSING_DEPTH;
        }

        let mut pending = holes.clone();
        let mut iterations = 0usize;
        while !pending.is_empty() && iterations < params.max_iterations {
            let updates: Vec<(usize, f32)> = pending
                .iter()
                .filter_map(|&i| neighbour_mean(data, &valid, w, h, i).map(|m| (i, m)))
                .collect();
            if updates.is_empty() {
                break;
            }
            iterations += 1;
            for &(i, m) in &updates {
                data[i] = m;
                valid[i] = true;
            }
            pending.retain(|&i| !valid[i]);
        }

        let filled: Vec<usize> = holes.iter().copied().filter(|&i| valid[i]).collect();
        for _ in 0..params.smoothing_iterations {
            let relaxed: Vec<(usize, f32)> = filled
                .iter()
                .filter_map(|&i| neighbour_mean(data, &valid, w, h, i).map(|m| (i, m)))
                .collect();
            for (i, m) in relaxed {
                data[i] = m;
            }
        }

        let report = InpaintReport {
            filled: filled.len(),
            remaining: pending.len(),
            iterations,
        };
        if !report.converged() {
            warn!(
                "inpainting stopped after {} passes with {} pixels still missing",
                report.iterations, report.remaining
            );
        }
        report
    }
}

impl Deref for DepthImage {
    type Target = Image;

    fn deref(&self) -> &Image {
        &self.image
    }
}

impl DerefMut for DepthImage {
    fn deref_mut(&mut self) -> &mut Image {
        &mut self.image
    }
}

#[inline]
fn is_missing(v: f32) -> bool {
    v == MISSING_DEPTH || !v.is_finite()
}

fn parse_point_row(fields: &[&str], ordinal: usize, value: DepthValue) -> Option<(usize, f64)> {
    if fields.len() < 3 {
        return None;
    }
    let xyz: Vec<f64> = fields[..3]
        .iter()
        .map(|f| f.parse::<f64>().ok())
        .collect::<Option<_>>()?;
    let index = match fields.get(4) {
        Some(raw) => {
            let idx: f64 = raw.parse().ok()?;
            if !idx.is_finite() || idx < 0.0 || idx.fract() != 0.0 {
                return None;
            }
            idx as usize
        }
        None => ordinal,
    };
    let v = match value {
        DepthValue::Range => (xyz[0] * xyz[0] + xyz[1] * xyz[1] + xyz[2] * xyz[2]).sqrt(),
        DepthValue::Field(i) => fields.get(i)?.parse().ok()?,
    };
    Some((index, v))
}

// Mean of the valid 8-neighbours of pixel `i`.
fn neighbour_mean(data: &[f32], valid: &[bool], w: usize, h: usize, i: usize) -> Option<f32> {
    let row = (i / w) as i64;
    let col = (i % w) as i64;
    let mut sum = 0.0f64;
    let mut n = 0u32;
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let (r, c) = (row + dy, col + dx);
            if r < 0 || c < 0 || r >= h as i64 || c >= w as i64 {
                continue;
            }
            let j = r as usize * w + c as usize;
            if valid[j] {
                sum += data[j] as f64;
                n += 1;
            }
        }
    }
    (n > 0).then(|| (sum / n as f64) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    const HEADER: &str = "\
# .PCD v.7 - Point Cloud Data file format
FIELDS x y z rgb index
SIZE 4 4 4 4 4
TYPE F F F F U
COUNT 1 1 1 1 1
WIDTH 253674
HEIGHT 1
POINTS 253674
DATA ascii
";

    fn cloud_3x3_missing_one() -> String {
        let mut text = HEADER.to_string();
        for idx in 0..9 {
            if idx == 4 {
                continue;
            }
            let z = 1000.0 + idx as f64 * 10.0;
            text.push_str(&format!("0 0 {z} 4.2108e+06 {idx}\n"));
        }
        text
    }

    #[test]
    fn parses_indexed_rows_into_metres() {
        let depth = DepthImage::parse_pcd_str(&cloud_3x3_missing_one(), 3, 3, DepthValue::Range);
        assert_relative_eq!(depth.get(0, 0, 0), 1.0);
        assert_relative_eq!(depth.get(2, 2, 0), 1.08);
        assert_eq!(depth.get(1, 1, 0), MISSING_DEPTH);
        assert_eq!(depth.missing_count(), 1);
    }

    #[test]
    fn range_uses_all_three_coordinates() {
        let text = format!("{HEADER}300 400 1200 0 0\n");
        let depth = DepthImage::parse_pcd_str(&text, 1, 1, DepthValue::Range);
        assert_relative_eq!(depth.get(0, 0, 0), 1.3, epsilon = 1e-6);
        let z_only = DepthImage::parse_pcd_str(&text, 1, 1, DepthValue::Field(2));
        assert_relative_eq!(z_only.get(0, 0, 0), 1.2, epsilon = 1e-6);
    }

    #[test]
    fn rows_without_index_use_their_position() {
        let text = format!("{HEADER}0 0 1000\nnot a point\n0 0 3000\n");
        let depth = DepthImage::parse_pcd_str(&text, 3, 1, DepthValue::Range);
        assert_eq!(depth.data, vec![1.0, 0.0, 3.0]);
    }

    #[test]
    fn header_lines_and_bad_rows_are_skipped() {
        let text = "\
0 0 1000 0 0
DATA ascii
0 0 2000 0 1
0 0 2000 0 99
nan nan nan 0 2
0 0 2000 0 1.5
";
        let depth = DepthImage::parse_pcd_str(text, 2, 2, DepthValue::Range);
        assert_eq!(depth.data, vec![0.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn missing_sentinel_gives_empty_map() {
        let depth = DepthImage::parse_pcd_str("0 0 1000 0 0\n", 2, 1, DepthValue::Range);
        assert_eq!(depth.missing_count(), 2);
    }

    #[test]
    fn from_pcd_reads_files_and_reports_missing_ones() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(cloud_3x3_missing_one().as_bytes()).unwrap();
        let depth = DepthImage::from_pcd(f.path(), 3, 3).unwrap();
        assert_eq!(depth.missing_count(), 1);
        assert!(DepthImage::from_pcd("/no/such/pcd0100.txt", 3, 3).is_err());
    }

    #[test]
    fn inpaint_fills_single_hole() {
        let mut depth =
            DepthImage::parse_pcd_str(&cloud_3x3_missing_one(), 3, 3, DepthValue::Range);
        let report = depth.inpaint();
        assert!(report.converged());
        assert_eq!(report.filled, 1);
        assert_eq!(depth.missing_count(), 0);
        // Mean of the 8 neighbours: z = 1000..1080 without 1040.
        assert_relative_eq!(depth.get(1, 1, 0), 1.04, epsilon = 1e-6);
    }

    #[test]
    fn inpaint_closes_large_holes_and_keeps_measurements() {
        let mut img = Image::zeros(16, 12, 1);
        for c in 0..16 {
            img.set(0, c, 0, 2.0);
        }
        img.set(11, 15, 0, 4.0);
        let mut depth = DepthImage::new(img);
        let report = depth.inpaint();
        assert!(report.converged());
        assert_eq!(depth.missing_count(), 0);
        assert_eq!(depth.get(0, 3, 0), 2.0);
        assert_eq!(depth.get(11, 15, 0), 4.0);
        assert!(depth.data.iter().all(|&v| (2.0..=4.0).contains(&v)));
    }

    #[test]
    fn inpaint_gives_up_gracefully() {
        let mut depth = DepthImage::zeros(4, 4);
        let report = depth.inpaint();
        assert_eq!(report.remaining, 16);
        assert_eq!(report.iterations, 0);

        let mut img = Image::zeros(10, 1, 1);
        img.set(0, 0, 0, 1.0);
        let mut depth = DepthImage::new(img);
        let report = depth.inpaint_with(&InpaintParams {
            max_iterations: 3,
            smoothing_iterations: 0,
        });
        assert_eq!(report.iterations, 3);
        assert_eq!(report.remaining, 6);
        assert_eq!(depth.missing_count(), 6);
    }
}
