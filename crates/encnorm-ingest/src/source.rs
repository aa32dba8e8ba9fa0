//! Record sources producing raw encounter rows.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use encnorm_model::RawRow;
use polars::prelude::{AnyValue, DataFrame};

use crate::columns::ColumnLayout;
use crate::error::{IngestError, Result};

/// A materialized sequence of raw rows.
pub trait RecordSource {
    fn read_rows(&mut self) -> Result<Vec<RawRow>>;
}

impl RecordSource for Vec<RawRow> {
    fn read_rows(&mut self) -> Result<Vec<RawRow>> {
        Ok(std::mem::take(self))
    }
}

/// Raw encounter file in CSV form, resolved by header name.
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    path: PathBuf,
}

impl CsvRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for CsvRecordSource {
    fn read_rows(&mut self) -> Result<Vec<RawRow>> {
        let file =
            File::open(&self.path).map_err(|source| IngestError::open(self.path.clone(), source))?;
        let rows = read_csv_rows(file, &self.path.display().to_string())?;
        tracing::info!(
            path = %self.path.display(),
            row_count = rows.len(),
            "read raw encounter file"
        );
        Ok(rows)
    }
}

/// Read raw rows from any CSV stream with a header line.
pub fn read_csv_rows<R: Read>(input: R, origin: &str) -> Result<Vec<RawRow>> {
    let csv_error = |source| IngestError::Csv {
        origin: origin.to_string(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();
    let layout = ColumnLayout::from_headers(&headers, origin)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        let line = record.position().map_or(0, csv::Position::line);
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        rows.push(layout.build_row(&cells, line)?);
    }
    Ok(rows)
}

/// Raw rows held in a polars `DataFrame`, one column per raw column.
#[derive(Debug, Clone)]
pub struct FrameRecordSource {
    frame: DataFrame,
}

impl FrameRecordSource {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }
}

impl RecordSource for FrameRecordSource {
    fn read_rows(&mut self) -> Result<Vec<RawRow>> {
        let headers: Vec<String> = self
            .frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let layout = ColumnLayout::from_headers(&headers, "data frame")?;
        let columns = self.frame.get_columns();

        let mut rows = Vec::with_capacity(self.frame.height());
        for idx in 0..self.frame.height() {
            let mut cells = Vec::with_capacity(columns.len());
            for column in columns {
                let value = column.get(idx).map_err(|err| IngestError::DataFrame {
                    message: err.to_string(),
                })?;
                cells.push(any_to_string(value));
            }
            // Frame rows are reported 1-based, matching a header-less listing.
            rows.push(layout.build_row(&cells, idx as u64 + 1)?);
        }
        Ok(rows)
    }
}

/// Text of a frame cell; nulls become empty cells.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}
