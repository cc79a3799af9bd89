//! File naming of the raw Cornell grasp dataset.
//!
//! Every scene `<id>` (4 digits) is stored as `pcd<id>r.png` (RGB),
//! `pcd<id>.txt` (point cloud), `pcd<id>cpos.txt` (positive grasps) and
//! `pcd<id>cneg.txt` (negative grasps).

use crate::DatasetError;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetLayout {
    root: PathBuf,
}

impl DatasetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn rgb_path(&self, img_id: &str) -> PathBuf {
        self.root.join(format!("pcd{img_id}r.png"))
    }

    pub fn pcd_path(&self, img_id: &str) -> PathBuf {
        self.root.join(format!("pcd{img_id}.txt"))
    }

    pub fn pos_grasp_path(&self, img_id: &str) -> PathBuf {
        self.root.join(format!("pcd{img_id}cpos.txt"))
    }

    pub fn neg_grasp_path(&self, img_id: &str) -> PathBuf {
        self.root.join(format!("pcd{img_id}cneg.txt"))
    }

    /// Ids of all scenes with an RGB image, sorted.
    pub fn image_ids(&self) -> Result<Vec<String>, DatasetError> {
        let pattern = self.root.join("pcd*r.png");
        let mut ids: Vec<String> = glob::glob(&pattern.to_string_lossy())?
            .filter_map(Result::ok)
            .filter_map(|p| {
                let name = p.file_name()?.to_str()?;
                let id = name.strip_prefix("pcd")?.strip_suffix("r.png")?;
                (!id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())).then(|| id.to_string())
            })
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

/// Numeric form of an image id (`"0100"` -> `100`).
pub fn numeric_id(img_id: &str) -> Result<u32, DatasetError> {
    img_id
        .parse()
        .map_err(|_| DatasetError::InvalidImageId(img_id.to_string()))
}
