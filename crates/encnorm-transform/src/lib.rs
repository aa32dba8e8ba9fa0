//! Normalization engine for denormalized hospital encounter records.
//!
//! This crate turns raw rows into code tables, patients, encounters and the
//! encounters' diagnoses and medications:
//!
//! - **normalization**: sentinel handling, flag decoding, code table building
//! - **patient**: one patient per external key, from the earliest encounter
//! - **encounter**: one encounter per row, categoricals as code ids
//! - **relations**: diagnosis slots and prescribed medications
//! - **sink**: the table sink contract and an in-memory sink
//! - **pipeline**: the phased run tying it together

pub mod encounter;
pub mod normalization;
pub mod patient;
pub mod pipeline;
pub mod relations;
pub mod sink;

pub use encounter::normalize_encounter;
pub use normalization::{
    MappedNames, NameSource, SentinelPolicy, TemplateNames, build_code_tables, decode_flag,
    normalize_sentinel,
};
pub use patient::{group_by_patient, representative, resolve_patients};
pub use pipeline::Normalizer;
pub use relations::{resolve_diagnoses, resolve_medications};
pub use sink::{MemorySink, TableSink};
