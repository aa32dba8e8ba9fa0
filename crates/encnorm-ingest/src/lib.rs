//! Reading raw encounter data.
//!
//! - **source**: the [`RecordSource`] trait with CSV and polars implementations
//! - **columns**: header resolution and row construction
//! - **mapping**: the sectioned ID-mapping file
//! - **error**: ingest error types

pub mod columns;
pub mod error;
pub mod mapping;
pub mod source;

pub use columns::ColumnLayout;
pub use error::{IngestError, Result};
pub use mapping::{load_id_mapping, parse_id_mapping};
pub use source::{CsvRecordSource, FrameRecordSource, RecordSource, any_to_string, read_csv_rows};
