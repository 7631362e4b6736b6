use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::domain::{SpeciesSlug, TaxonKey};
use crate::download::DownloadReport;
use crate::error::GbifError;
use crate::species::ResolvedSpecies;

pub const METADATA_FILE: &str = "gbif-metadata.json";

// multimedia_count is the requested work; the outcome counts appear only after
// reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    #[serde(rename = "taxonKey")]
    pub taxon_key: TaxonKey,
    pub species: SpeciesSlug,
    pub multimedia_count: usize,
    pub multimedia_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloaded_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_count: Option<usize>,
    pub generated_at: String,
    pub tool: String,
}

impl RunMetadata {
    pub fn new(species: &ResolvedSpecies, urls: Vec<String>) -> Self {
        Self {
            taxon_key: species.taxon_key.clone(),
            species: species.slug.clone(),
            multimedia_count: urls.len(),
            multimedia_urls: urls,
            downloaded_count: None,
            skipped_count: None,
            failed_count: None,
            generated_at: chrono::Utc::now().to_rfc3339(),
            tool: format!("gbif-fetch/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn reconcile(&mut self, report: &DownloadReport) {
        self.downloaded_count = Some(report.downloaded);
        self.skipped_count = Some(report.skipped);
        self.failed_count = Some(report.failed.len());
    }

    pub fn to_json(&self) -> Result<Vec<u8>, GbifError> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)
            .map_err(|err| GbifError::Filesystem(err.to_string()))?;
        Ok(buf)
    }

    pub fn write(&self, path: &Utf8Path) -> Result<(), GbifError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent.as_std_path())
                .map_err(|err| GbifError::Filesystem(err.to_string()))?;
        }
        let tmp_path = path.with_extension("json.tmp");
        fs::write(tmp_path.as_std_path(), self.to_json()?)
            .map_err(|err| GbifError::Filesystem(err.to_string()))?;
        fs::rename(tmp_path.as_std_path(), path.as_std_path())
            .map_err(|err| GbifError::Filesystem(err.to_string()))?;
        Ok(())
    }

    pub fn read(path: &Utf8Path) -> Result<Self, GbifError> {
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|err| GbifError::Filesystem(format!("read {path}: {err}")))?;
        serde_json::from_str(&content).map_err(|err| GbifError::Filesystem(err.to_string()))
    }
}

pub fn relocate(source: &Utf8Path, dest_dir: &Utf8Path) -> Result<Utf8PathBuf, GbifError> {
    let file_name = source
        .file_name()
        .ok_or_else(|| GbifError::Filesystem(format!("invalid metadata path {source}")))?;
    let dest = dest_dir.join(file_name);
    if fs::rename(source.as_std_path(), dest.as_std_path()).is_err() {
        // rename fails across filesystems
        fs::copy(source.as_std_path(), dest.as_std_path())
            .map_err(|err| GbifError::Filesystem(format!("move {source} to {dest}: {err}")))?;
        fs::remove_file(source.as_std_path())
            .map_err(|err| GbifError::Filesystem(format!("remove {source}: {err}")))?;
    }
    Ok(dest)
}
