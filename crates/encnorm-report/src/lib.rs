//! Export of normalized encounter tables.
//!
//! - **frames**: one polars `DataFrame` per output table
//! - **export**: CSV and JSON writers
//! - **error**: export error types

pub mod error;
pub mod export;
pub mod frames;

pub use error::{ReportError, Result};
pub use export::{
    JSON_FILE_NAME, ensure_output_dir, read_json_output, write_csv_outputs, write_json_output,
};
pub use frames::{
    code_frame, diagnosis_frame, encounter_frame, medication_frame, patient_frame, table_frames,
};
