//! Writing normalized tables to disk.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;

use encnorm_model::NormalizedTables;
use polars::prelude::{CsvWriter, SerWriter};
use tracing::{debug, info};

use crate::error::{ReportError, Result};
use crate::frames::table_frames;

/// File name of the single-document JSON export.
pub const JSON_FILE_NAME: &str = "normalized.json";

/// Create the output directory if needed.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write one `<table>.csv` file per normalized table.
///
/// Returns the written paths in table order.
pub fn write_csv_outputs(output_dir: &Path, tables: &NormalizedTables) -> Result<Vec<PathBuf>> {
    let start = Instant::now();
    ensure_output_dir(output_dir)?;
    let mut written = Vec::new();
    for (table, mut frame) in table_frames(tables)? {
        let path = output_dir.join(format!("{table}.csv"));
        let mut file = File::create(&path).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut frame)
            .map_err(|source| ReportError::Csv {
                path: path.clone(),
                source,
            })?;
        debug!(table, rows = frame.height(), path = %path.display(), "wrote CSV table");
        written.push(path);
    }
    info!(
        files = written.len(),
        output_dir = %output_dir.display(),
        duration_ms = start.elapsed().as_millis(),
        "CSV export complete"
    );
    Ok(written)
}

/// Write every table into one pretty-printed JSON document.
pub fn write_json_output(output_dir: &Path, tables: &NormalizedTables) -> Result<PathBuf> {
    ensure_output_dir(output_dir)?;
    let path = output_dir.join(JSON_FILE_NAME);
    let json = serde_json::to_string_pretty(tables).map_err(|source| ReportError::Json {
        path: path.clone(),
        source,
    })?;
    fs::write(&path, json).map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "JSON export complete");
    Ok(path)
}

/// Read a JSON export back.
pub fn read_json_output(path: &Path) -> Result<NormalizedTables> {
    let content = fs::read_to_string(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ReportError::Json {
        path: path.to_path_buf(),
        source,
    })
}
