use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::GbifError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxonKey(String);

impl TaxonKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaxonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesSlug(String);

impl SpeciesSlug {
    pub fn from_name(name: &str) -> Self {
        Self(name.to_lowercase().replace(' ', "_"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpeciesSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OccurrenceRecord {
    #[serde(rename = "taxonKey")]
    pub taxon_key: TaxonKey,
    #[serde(default)]
    pub species: String,
    #[serde(rename = "scientificName", default)]
    pub scientific_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MultimediaRecord {
    #[serde(default)]
    pub identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetName {
    pub token: String,
    pub extension: String,
}

impl AssetName {
    pub fn from_url(raw: &str) -> Result<Self, GbifError> {
        let raw = raw.trim();
        Url::parse(raw).map_err(|err| GbifError::InvalidUrl(format!("{raw}: {err}")))?;

        // Names come from the identifier as written, not its normalised form.
        let path = raw.split(['?', '#']).next().unwrap_or(raw);
        let segments = path.split('/').collect::<Vec<_>>();
        let (token, file_name) = match segments.as_slice() {
            [.., token, file_name] => (*token, *file_name),
            _ => return Err(GbifError::InvalidUrl(raw.to_string())),
        };
        if token.is_empty() {
            return Err(GbifError::InvalidUrl(format!("{raw}: no asset token")));
        }

        Ok(Self {
            token: token.to_string(),
            extension: file_extension(file_name).to_string(),
        })
    }

    pub fn file_name(&self, slug: &SpeciesSlug) -> String {
        format!("{}-{}{}", slug.as_str(), self.token, self.extension)
    }
}

// Leading dots belong to the stem, so ".hidden" has no extension.
fn file_extension(file_name: &str) -> &str {
    let Some(dot) = file_name.rfind('.') else {
        return "";
    };
    if file_name[..dot].chars().all(|ch| ch == '.') {
        return "";
    }
    &file_name[dot..]
}
