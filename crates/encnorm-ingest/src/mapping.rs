//! Loader for the ID-mapping file shipped alongside the raw encounter file.
//!
//! The file holds one section per fixed-code column. Each section starts with
//! a `<column>,description` header and lists `code,description` pairs; sections
//! are separated by blank or comma-only lines.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use encnorm_model::schema::CATEGORICAL_COLUMNS;
use encnorm_model::{Dimension, IdMapping, IdPolicy};

use crate::columns::normalize_cell;
use crate::error::{IngestError, Result};

fn section_dimension(column: &str) -> Option<Dimension> {
    CATEGORICAL_COLUMNS
        .iter()
        .find(|(name, dimension)| *name == column && dimension.id_policy() == IdPolicy::Fixed)
        .map(|&(_, dimension)| dimension)
}

/// Load code descriptions for the fixed-code dimensions.
pub fn load_id_mapping(path: &Path) -> Result<IdMapping> {
    let file = File::open(path).map_err(|source| IngestError::open(path.to_path_buf(), source))?;
    let mapping = parse_id_mapping(file, path)?;
    tracing::debug!(
        path = %path.display(),
        admission_type = mapping.codes(Dimension::AdmissionType),
        discharge_disposition = mapping.codes(Dimension::DischargeDisposition),
        admission_source = mapping.codes(Dimension::AdmissionSource),
        "loaded ID mapping"
    );
    Ok(mapping)
}

/// Parse ID-mapping content; `path` is only used in error messages.
pub fn parse_id_mapping<R: Read>(input: R, path: &Path) -> Result<IdMapping> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);
    let mut mapping = IdMapping::new();
    let mut current: Option<Dimension> = None;

    for record in reader.records() {
        let record = record.map_err(|source| IngestError::Csv {
            origin: path.display().to_string(),
            source,
        })?;
        let line = record.position().map_or(0, csv::Position::line);
        let cells: Vec<String> = record.iter().map(normalize_cell).collect();
        let first = cells.first().map(String::as_str).unwrap_or_default();

        if cells.iter().all(String::is_empty) {
            current = None;
            continue;
        }
        if let Some(dimension) = section_dimension(first) {
            current = Some(dimension);
            continue;
        }
        let Some(dimension) = current else {
            return Err(IngestError::MappingFormat {
                path: path.to_path_buf(),
                line,
                reason: format!("row '{first}' appears outside a section"),
            });
        };
        let code = first
            .parse::<i64>()
            .map_err(|_| IngestError::MappingFormat {
                path: path.to_path_buf(),
                line,
                reason: format!("code '{first}' is not an integer"),
            })?;
        let description = cells[1..].join(",");
        mapping
            .insert(dimension, code, description)
            .map_err(|conflict| IngestError::MappingFormat {
                path: path.to_path_buf(),
                line,
                reason: format!(
                    "code {} of {dimension} described as '{}' and '{}'",
                    conflict.id, conflict.existing, conflict.incoming
                ),
            })?;
    }
    Ok(mapping)
}
