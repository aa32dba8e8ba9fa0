//! Data model for the hospital encounter normalization engine.
//!
//! - **ids**: external keys and surrogate code ids
//! - **raw**: the denormalized input row
//! - **schema**: static layout of the raw file (columns, diagnosis slots, medications)
//! - **codes**: code tables and the per-run table set
//! - **entity**: normalized patients, encounters and their relations
//! - **mapping**: descriptions of fixed numeric codes
//! - **options**: run configuration
//! - **report**: run summary and row-scoped issues
//! - **tables**: the complete normalized output

pub mod codes;
pub mod entity;
pub mod error;
pub mod ids;
pub mod mapping;
pub mod options;
pub mod raw;
pub mod report;
pub mod schema;
pub mod tables;

pub use codes::{CodeConflict, CodeEntry, CodeTable, CodeTableSet, Dimension, IdPolicy};
pub use entity::{DiagnosisPosition, Encounter, EncounterDiagnosis, EncounterMedication, Patient};
pub use error::{ConfigError, ErrorKind, ModelError, NormalizeError, Result, SinkError};
pub use ids::{CodeId, EncounterKey, PatientKey};
pub use mapping::IdMapping;
pub use options::{FlagTokens, NameTemplates, NormalizationConfig};
pub use raw::{MedicationCell, RawRow};
pub use report::{RowIssue, RunReport, TableCount};
pub use tables::NormalizedTables;
