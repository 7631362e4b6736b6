use std::io::{self, Write};
use std::time::Duration;

use camino::Utf8PathBuf;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use tracing::{debug, warn};

use crate::app::{ProgressEvent, ProgressSink};
use crate::config::HttpSettings;
use crate::domain::{AssetName, SpeciesSlug};
use crate::error::GbifError;
use crate::layout::OutputLayout;

pub trait MediaClient {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64, GbifError>;
}

#[derive(Clone)]
pub struct HttpMediaClient {
    client: Client,
}

impl HttpMediaClient {
    pub fn new(settings: &HttpSettings) -> Result<Self, GbifError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&settings.user_agent)
                .map_err(|err| GbifError::Http(format!("invalid user agent: {err}")))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|err| GbifError::Http(err.to_string()))?;
        Ok(Self { client })
    }
}

impl MediaClient for HttpMediaClient {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64, GbifError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|err| GbifError::Http(err.to_string()))?;
        if !response.status().is_success() {
            return Err(GbifError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        io::copy(&mut response, sink).map_err(|err| GbifError::Http(format!("{url}: {err}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Url,
    Network,
    Filesystem,
}

impl From<&GbifError> for FailureKind {
    fn from(err: &GbifError) -> Self {
        match err {
            GbifError::InvalidUrl(_) => FailureKind::Url,
            GbifError::Http(_) | GbifError::HttpStatus { .. } | GbifError::EmptyBody(_) => {
                FailureKind::Network
            }
            _ => FailureKind::Filesystem,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetFailure {
    pub index: usize,
    pub url: String,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    Downloaded(Utf8PathBuf),
    Skipped(Utf8PathBuf),
    Failed(AssetFailure),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: Vec<AssetFailure>,
}

impl DownloadReport {
    fn record(&mut self, outcome: &AssetOutcome) {
        match outcome {
            AssetOutcome::Downloaded(_) => self.downloaded += 1,
            AssetOutcome::Skipped(_) => self.skipped += 1,
            AssetOutcome::Failed(failure) => self.failed.push(failure.clone()),
        }
    }
}

pub struct DownloadEngine<C: MediaClient> {
    client: C,
}

impl<C: MediaClient> DownloadEngine<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn run(
        &self,
        urls: &[String],
        slug: &SpeciesSlug,
        layout: &OutputLayout,
        sink: &dyn ProgressSink,
    ) -> DownloadReport {
        let mut report = DownloadReport::default();
        sink.event(ProgressEvent::DownloadStarted { total: urls.len() });

        for (index, url) in urls.iter().enumerate() {
            let outcome = match self.download_one(url, slug, layout) {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(index, url = %url, error = %err, "did not download asset");
                    AssetOutcome::Failed(AssetFailure {
                        index,
                        url: url.clone(),
                        kind: FailureKind::from(&err),
                        message: err.to_string(),
                    })
                }
            };
            report.record(&outcome);
            sink.event(ProgressEvent::AssetFinished { index, outcome });
        }

        sink.event(ProgressEvent::DownloadFinished);
        report
    }

    fn download_one(
        &self,
        url: &str,
        slug: &SpeciesSlug,
        layout: &OutputLayout,
    ) -> Result<AssetOutcome, GbifError> {
        let name = AssetName::from_url(url)?;
        let target = layout.asset_path(&name.file_name(slug));
        if target.as_std_path().exists() {
            debug!(path = %target, "asset already present");
            return Ok(AssetOutcome::Skipped(target));
        }

        // Dropping the temp file on any error removes the partial body.
        let mut temp = tempfile::Builder::new()
            .prefix(".gbif-fetch")
            .tempfile_in(layout.images_dir().as_std_path())
            .map_err(|err| GbifError::Filesystem(err.to_string()))?;
        let bytes = self.client.fetch(url, temp.as_file_mut())?;
        if bytes == 0 {
            return Err(GbifError::EmptyBody(url.to_string()));
        }
        temp.as_file_mut()
            .flush()
            .map_err(|err| GbifError::Filesystem(err.to_string()))?;
        temp.persist(target.as_std_path())
            .map_err(|err| GbifError::Filesystem(err.to_string()))?;
        debug!(path = %target, bytes, "asset written");
        Ok(AssetOutcome::Downloaded(target))
    }
}
