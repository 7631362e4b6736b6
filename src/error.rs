use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum GbifError {
    #[error("'{0}' does not exist or cannot be opened")]
    #[diagnostic(help("pass the path of a GBIF Darwin Core download (.zip)"))]
    ArchiveOpen(PathBuf),

    #[error("invalid archive {path}: {message}")]
    ArchiveFormat { path: PathBuf, message: String },

    #[error("archive is missing required table {0}")]
    MissingTable(String),

    #[error("failed to parse {table}: {message}")]
    TableParse { table: String, message: String },

    #[error("{0} contains no records")]
    EmptyTable(String),

    #[error("occurrence record has no species name (taxonKey {0})")]
    MissingSpeciesName(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid media URL: {0}")]
    InvalidUrl(String),

    #[error("media request failed: {0}")]
    Http(String),

    #[error("media server returned status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("media server returned an empty body for {0}")]
    EmptyBody(String),

    #[error("failed to read confirmation: {0}")]
    Prompt(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl GbifError {
    pub fn exit_code(&self) -> u8 {
        match self {
            GbifError::ArchiveOpen(_)
            | GbifError::ArchiveFormat { .. }
            | GbifError::MissingTable(_)
            | GbifError::TableParse { .. }
            | GbifError::EmptyTable(_)
            | GbifError::MissingSpeciesName(_) => 2,
            GbifError::ConfigRead(_) | GbifError::ConfigParse(_) => 3,
            _ => 1,
        }
    }
}
