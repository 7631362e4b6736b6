use std::path::Path;

use csv::ReaderBuilder;
use serde::de::DeserializeOwned;

use crate::domain::{MultimediaRecord, OccurrenceRecord};
use crate::error::GbifError;

pub const OCCURRENCE_TABLE: &str = "occurrence.txt";
pub const MULTIMEDIA_TABLE: &str = "multimedia.txt";

#[derive(Debug, Clone)]
pub struct Dataset {
    pub occurrences: Vec<OccurrenceRecord>,
    pub multimedia: Vec<MultimediaRecord>,
}

impl Dataset {
    pub fn read(extracted_dir: &Path) -> Result<Self, GbifError> {
        let occurrences = read_table(extracted_dir, OCCURRENCE_TABLE)?;
        if occurrences.is_empty() {
            return Err(GbifError::EmptyTable(OCCURRENCE_TABLE.to_string()));
        }
        let multimedia = read_table(extracted_dir, MULTIMEDIA_TABLE)?;
        Ok(Self {
            occurrences,
            multimedia,
        })
    }

    pub fn media_urls(&self) -> Vec<String> {
        self.multimedia
            .iter()
            .map(|record| record.identifier.clone())
            .collect()
    }
}

// GBIF writes unquoted TSV; quote characters inside values are literal.
fn read_table<T: DeserializeOwned>(dir: &Path, table: &str) -> Result<Vec<T>, GbifError> {
    let path = dir.join(table);
    if !path.is_file() {
        return Err(GbifError::MissingTable(table.to_string()));
    }
    let parse_err = |message: String| GbifError::TableParse {
        table: table.to_string(),
        message,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_path(&path)
        .map_err(|err| parse_err(err.to_string()))?;

    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: T = result.map_err(|err| parse_err(err.to_string()))?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use assert_matches::assert_matches;

    use super::*;

    const OCCURRENCE: &str = "gbifID\ttaxonKey\tscientificName\tspecies\n\
        1\t5133088\tDanaus plexippus (Linnaeus, 1758)\tDanaus plexippus\n\
        2\t5133088\tDanaus plexippus (Linnaeus, 1758)\tDanaus plexippus\n";

    const MULTIMEDIA: &str = "gbifID\ttype\tidentifier\n\
        1\tStillImage\thttps://example.org/photos/11/original.jpg\n\
        2\tStillImage\thttps://example.org/photos/12/original.jpeg\n\
        2\tStillImage\t\n";

    #[test]
    fn reads_both_tables_in_order() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join(OCCURRENCE_TABLE), OCCURRENCE).unwrap();
        fs::write(temp.path().join(MULTIMEDIA_TABLE), MULTIMEDIA).unwrap();

        let dataset = Dataset::read(temp.path()).unwrap();
        assert_eq!(dataset.occurrences.len(), 2);
        assert_eq!(dataset.occurrences[0].taxon_key.as_str(), "5133088");
        assert_eq!(dataset.occurrences[0].species, "Danaus plexippus");
        assert_eq!(
            dataset.media_urls(),
            vec![
                "https://example.org/photos/11/original.jpg".to_string(),
                "https://example.org/photos/12/original.jpeg".to_string(),
                String::new(),
            ]
        );
    }

    #[test]
    fn literal_quotes_do_not_break_rows() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join(OCCURRENCE_TABLE),
            "taxonKey\tspecies\tscientificName\n1\tAbc def\t\"Abc\" def\n",
        )
        .unwrap();
        fs::write(temp.path().join(MULTIMEDIA_TABLE), "identifier\n").unwrap();

        let dataset = Dataset::read(temp.path()).unwrap();
        assert_eq!(dataset.occurrences[0].scientific_name, "\"Abc\" def");
        assert!(dataset.multimedia.is_empty());
    }

    #[test]
    fn missing_multimedia_table() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join(OCCURRENCE_TABLE), OCCURRENCE).unwrap();
        let err = Dataset::read(temp.path()).unwrap_err();
        assert_matches!(err, GbifError::MissingTable(table) if table == MULTIMEDIA_TABLE);
    }

    #[test]
    fn missing_taxon_key_column() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join(OCCURRENCE_TABLE), "species\nAbc def\n").unwrap();
        fs::write(temp.path().join(MULTIMEDIA_TABLE), MULTIMEDIA).unwrap();
        let err = Dataset::read(temp.path()).unwrap_err();
        assert_matches!(err, GbifError::TableParse { .. });
    }

    #[test]
    fn empty_occurrence_table() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join(OCCURRENCE_TABLE),
            "taxonKey\tspecies\tscientificName\n",
        )
        .unwrap();
        fs::write(temp.path().join(MULTIMEDIA_TABLE), MULTIMEDIA).unwrap();
        let err = Dataset::read(temp.path()).unwrap_err();
        assert_matches!(err, GbifError::EmptyTable(_));
    }
}
