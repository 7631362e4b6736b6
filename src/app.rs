use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tempfile::TempDir;
use tracing::info;

use crate::config::RunConfig;
use crate::dataset::Dataset;
use crate::download::{AssetOutcome, DownloadEngine, DownloadReport, MediaClient};
use crate::error::GbifError;
use crate::fs_util;
use crate::layout::{LayoutStatus, OutputLayout};
use crate::metadata::{self, METADATA_FILE, RunMetadata};
use crate::species::{AssumeYes, Prompt, Resolution, ResolvedSpecies, SpeciesResolver};

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Stage(String),
    DownloadStarted { total: usize },
    AssetFinished { index: usize, outcome: AssetOutcome },
    DownloadFinished,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn event(&self, _event: ProgressEvent) {}
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub species: ResolvedSpecies,
    pub layout: LayoutStatus,
    pub base_dir: Utf8PathBuf,
    pub metadata_path: Utf8PathBuf,
    pub multimedia_count: usize,
    pub report: DownloadReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    Declined,
    InvalidAnswer(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed(RunSummary),
    Aborted { reason: AbortReason },
}

impl RunOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Aborted {
                reason: AbortReason::InvalidAnswer(_),
            } => 1,
            _ => 0,
        }
    }
}

pub struct App<C: MediaClient> {
    config: RunConfig,
    engine: DownloadEngine<C>,
}

impl<C: MediaClient> App<C> {
    pub fn new(config: RunConfig, client: C) -> Self {
        Self {
            config,
            engine: DownloadEngine::new(client),
        }
    }

    pub fn run(
        &self,
        prompt: &mut dyn Prompt,
        sink: &dyn ProgressSink,
    ) -> Result<RunOutcome, GbifError> {
        let output_root = self.config.output_root.as_path();
        let work_dir = fs_util::extract_archive(&self.config.archive, output_root)?;
        info!(
            archive = %self.config.archive,
            work_dir = %work_dir.path().display(),
            "archive extracted"
        );
        stage(sink, "Files extracted.".to_string());

        let dataset = Dataset::read(work_dir.path())?;

        let mut assume_yes = AssumeYes;
        let prompt: &mut dyn Prompt = if self.config.assume_yes {
            &mut assume_yes
        } else {
            prompt
        };
        let species = match SpeciesResolver::resolve(&dataset.occurrences, prompt)? {
            Resolution::Resolved(species) => species,
            Resolution::Declined => {
                fs_util::remove_work_dir(work_dir)?;
                return Ok(RunOutcome::Aborted {
                    reason: AbortReason::Declined,
                });
            }
            Resolution::InvalidAnswer(answer) => {
                fs_util::remove_work_dir(work_dir)?;
                return Ok(RunOutcome::Aborted {
                    reason: AbortReason::InvalidAnswer(answer),
                });
            }
        };
        info!(
            taxon_key = %species.taxon_key,
            species = %species.slug,
            validated = species.validated,
            "species resolved"
        );

        let layout = OutputLayout::new(output_root, &species.slug);
        let layout_status = layout.ensure()?;
        stage(
            sink,
            match layout_status {
                LayoutStatus::Created => format!("Folder '{}' created.", species.slug),
                LayoutStatus::Existing => format!("Folder '{}' already exists.", species.slug),
            },
        );

        let mut metadata = RunMetadata::new(&species, dataset.media_urls());
        let pending_metadata = output_root.join(METADATA_FILE);
        metadata.write(&pending_metadata)?;
        stage(
            sink,
            format!("{} files will be downloaded", metadata.multimedia_count),
        );

        let report = self
            .engine
            .run(&metadata.multimedia_urls, &species.slug, &layout, sink);
        info!(
            downloaded = report.downloaded,
            skipped = report.skipped,
            failed = report.failed.len(),
            "download loop finished"
        );

        let metadata_path =
            finalize(&mut metadata, &report, &pending_metadata, &layout, work_dir)?;
        stage(
            sink,
            format!("Done. All files moved to '{}'", layout.base_dir()),
        );

        Ok(RunOutcome::Completed(RunSummary {
            species,
            layout: layout_status,
            base_dir: layout.base_dir().to_path_buf(),
            metadata_path,
            multimedia_count: metadata.multimedia_count,
            report,
        }))
    }
}

fn finalize(
    metadata: &mut RunMetadata,
    report: &DownloadReport,
    pending: &Utf8Path,
    layout: &OutputLayout,
    work_dir: TempDir,
) -> Result<Utf8PathBuf, GbifError> {
    metadata.reconcile(report);
    metadata.write(pending)?;
    let dest = metadata::relocate(pending, layout.base_dir())?;
    fs_util::remove_work_dir(work_dir)?;
    Ok(dest)
}

fn stage(sink: &dyn ProgressSink, message: String) {
    sink.event(ProgressEvent::Stage(message));
}
