use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::domain::SpeciesSlug;
use crate::error::GbifError;

pub const IMAGES_DIR: &str = "imgs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutStatus {
    Created,
    Existing,
}

#[derive(Debug, Clone)]
pub struct OutputLayout {
    base_dir: Utf8PathBuf,
    images_dir: Utf8PathBuf,
}

impl OutputLayout {
    pub fn new(output_root: &Utf8Path, slug: &SpeciesSlug) -> Self {
        let base_dir = output_root.join(slug.as_str());
        let images_dir = base_dir.join(IMAGES_DIR);
        Self {
            base_dir,
            images_dir,
        }
    }

    pub fn base_dir(&self) -> &Utf8Path {
        &self.base_dir
    }

    pub fn images_dir(&self) -> &Utf8Path {
        &self.images_dir
    }

    // imgs is created even when the base directory already exists
    pub fn ensure(&self) -> Result<LayoutStatus, GbifError> {
        let status = if self.base_dir.as_std_path().exists() {
            LayoutStatus::Existing
        } else {
            LayoutStatus::Created
        };
        fs::create_dir_all(self.images_dir.as_std_path())
            .map_err(|err| GbifError::Filesystem(format!("create {}: {err}", self.images_dir)))?;
        Ok(status)
    }

    pub fn asset_path(&self, file_name: &str) -> Utf8PathBuf {
        self.images_dir.join(file_name)
    }
}
