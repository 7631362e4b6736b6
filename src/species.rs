use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};

use crossterm::style::Color;
use serde::Serialize;
use tracing::warn;

use crate::dataset::OCCURRENCE_TABLE;
use crate::domain::{OccurrenceRecord, SpeciesSlug, TaxonKey};
use crate::error::GbifError;
use crate::output::paint;

pub const CONFIRM_QUESTION: &str = "Continue anyway? (y/n)";

// With several taxon keys and an accepted prompt, this is the first row taken
// as-is and `validated` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSpecies {
    pub taxon_key: TaxonKey,
    pub slug: SpeciesSlug,
    pub validated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedSpecies),
    Declined,
    InvalidAnswer(String),
}

pub trait Prompt {
    fn ask(&mut self, names: &BTreeSet<String>, question: &str) -> Result<String, GbifError>;
}

pub struct LinePrompt<R, W> {
    input: R,
    output: W,
    colored: bool,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W, colored: bool) -> Self {
        Self {
            input,
            output,
            colored,
        }
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn ask(&mut self, names: &BTreeSet<String>, question: &str) -> Result<String, GbifError> {
        let prompt_err = |err: io::Error| GbifError::Prompt(err.to_string());
        let listed = names.iter().cloned().collect::<Vec<_>>().join(", ");
        let banner = paint(
            "ERROR: More than one species in dataset.",
            Color::Red,
            self.colored,
        );
        writeln!(self.output, "{banner}").map_err(prompt_err)?;
        writeln!(self.output, "{{{listed}}}").map_err(prompt_err)?;
        write!(self.output, "{question} ").map_err(prompt_err)?;
        self.output.flush().map_err(prompt_err)?;

        let mut line = String::new();
        self.input.read_line(&mut line).map_err(prompt_err)?;
        Ok(strip_line_ending(&line).to_string())
    }
}

pub struct AssumeYes;

impl Prompt for AssumeYes {
    fn ask(&mut self, _names: &BTreeSet<String>, _question: &str) -> Result<String, GbifError> {
        Ok("y".to_string())
    }
}

pub struct SpeciesResolver;

impl SpeciesResolver {
    pub fn distinct_taxon_keys(records: &[OccurrenceRecord]) -> BTreeSet<&TaxonKey> {
        records.iter().map(|record| &record.taxon_key).collect()
    }

    pub fn resolve(
        records: &[OccurrenceRecord],
        prompt: &mut dyn Prompt,
    ) -> Result<Resolution, GbifError> {
        let first = records
            .first()
            .ok_or_else(|| GbifError::EmptyTable(OCCURRENCE_TABLE.to_string()))?;

        let taxon_keys = Self::distinct_taxon_keys(records);
        if taxon_keys.len() <= 1 {
            return Self::from_record(first, true).map(Resolution::Resolved);
        }

        let names = records
            .iter()
            .map(|record| record.scientific_name.clone())
            .collect::<BTreeSet<_>>();
        warn!(
            taxon_keys = taxon_keys.len(),
            "more than one species in dataset: {}",
            names.iter().cloned().collect::<Vec<_>>().join("; ")
        );

        let answer = prompt.ask(&names, CONFIRM_QUESTION)?;
        match answer.as_str() {
            "y" => Self::from_record(first, false).map(Resolution::Resolved),
            "n" => Ok(Resolution::Declined),
            _ => Ok(Resolution::InvalidAnswer(answer)),
        }
    }

    fn from_record(
        record: &OccurrenceRecord,
        validated: bool,
    ) -> Result<ResolvedSpecies, GbifError> {
        if record.species.is_empty() {
            return Err(GbifError::MissingSpeciesName(
                record.taxon_key.as_str().to_string(),
            ));
        }
        Ok(ResolvedSpecies {
            taxon_key: record.taxon_key.clone(),
            slug: SpeciesSlug::from_name(&record.species),
            validated,
        })
    }
}

fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .unwrap_or(line)
}
