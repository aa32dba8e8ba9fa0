use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codes::Dimension;
use crate::ids::{EncounterKey, PatientKey};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid encounter key: {0:?}")]
    InvalidEncounterKey(String),
    #[error("invalid patient key: {0:?}")]
    InvalidPatientKey(String),
}

/// Failures raised by the normalization engine.
///
/// Code table and patient failures abort a run. Encounter and relation
/// failures are scoped to one raw row and are collected by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("{dimension} code {code} observed with conflicting names {existing:?} and {conflicting:?}")]
    DomainInconsistency {
        dimension: Dimension,
        code: i64,
        existing: String,
        conflicting: String,
    },

    #[error("invalid {dimension} code {value:?}: expected a non-negative integer")]
    InvalidCode { dimension: Dimension, value: String },

    #[error("encounter {encounter}: {dimension} value {value:?} is not in its code table")]
    UnresolvedReference {
        encounter: EncounterKey,
        dimension: Dimension,
        value: String,
    },

    #[error("encounter {encounter} references unresolved patient {patient}")]
    OrphanEncounter {
        encounter: EncounterKey,
        patient: PatientKey,
    },

    #[error("encounter {encounter} lists medication {medication:?} more than once")]
    DuplicateRelation {
        encounter: EncounterKey,
        medication: String,
    },

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl NormalizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DomainInconsistency { .. } => ErrorKind::DomainInconsistency,
            Self::InvalidCode { .. } => ErrorKind::InvalidCode,
            Self::UnresolvedReference { .. } => ErrorKind::UnresolvedReference,
            Self::OrphanEncounter { .. } => ErrorKind::OrphanEncounter,
            Self::DuplicateRelation { .. } => ErrorKind::DuplicateRelation,
            Self::Sink(SinkError::DuplicateKey { .. }) => ErrorKind::DuplicateKey,
            Self::Sink(SinkError::MissingReference { .. }) => ErrorKind::MissingReference,
            Self::Sink(SinkError::IdConflict { .. }) => ErrorKind::IdConflict,
        }
    }
}

/// Failures raised by a table sink when a write violates its constraints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("duplicate key {key} in {table}")]
    DuplicateKey { table: &'static str, key: String },

    #[error("{table} row {key} references missing {target} {reference}")]
    MissingReference {
        table: &'static str,
        key: String,
        target: &'static str,
        reference: String,
    },

    #[error("{table} id {id} already holds {existing:?}, cannot store {incoming:?}")]
    IdConflict {
        table: &'static str,
        id: i64,
        existing: String,
        incoming: String,
    },
}

/// Error taxonomy used in run summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DomainInconsistency,
    InvalidCode,
    UnresolvedReference,
    OrphanEncounter,
    DuplicateRelation,
    DuplicateKey,
    MissingReference,
    IdConflict,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DomainInconsistency => "domain_inconsistency",
            Self::InvalidCode => "invalid_code",
            Self::UnresolvedReference => "unresolved_reference",
            Self::OrphanEncounter => "orphan_encounter",
            Self::DuplicateRelation => "duplicate_relation",
            Self::DuplicateKey => "duplicate_key",
            Self::MissingReference => "missing_reference",
            Self::IdConflict => "id_conflict",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid name template {template:?}: missing {{code}} placeholder")]
    InvalidTemplate { template: String },
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
