//! Normalized entities produced by the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{CodeId, EncounterKey, PatientKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub key: PatientKey,
    pub race: Option<CodeId>,
    pub gender: Option<CodeId>,
    pub age_group: Option<CodeId>,
    pub payer_code: Option<String>,
    pub weight: Option<String>,
    /// Encounter whose row supplied the demographics.
    pub source_encounter: EncounterKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    pub key: EncounterKey,
    pub patient: PatientKey,
    pub admission_type: Option<CodeId>,
    pub discharge_disposition: Option<CodeId>,
    pub admission_source: Option<CodeId>,
    pub medical_specialty: Option<CodeId>,
    pub readmission: Option<CodeId>,
    pub a1c_result: Option<CodeId>,
    pub glucose_serum: Option<CodeId>,
    pub time_in_hospital: Option<u32>,
    pub num_lab_procedures: Option<u32>,
    pub num_procedures: Option<u32>,
    pub num_medications: Option<u32>,
    pub number_outpatient: Option<u32>,
    pub number_emergency: Option<u32>,
    pub number_inpatient: Option<u32>,
    pub number_diagnoses: Option<u32>,
    /// Medication change during the stay; `None` when unrecorded.
    pub change: Option<bool>,
    /// Diabetes medication prescribed; `None` when unrecorded.
    pub diabetes_med: Option<bool>,
}

/// Diagnosis slot, restricted to the three columns of the raw file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum DiagnosisPosition {
    First,
    Second,
    Third,
}

impl DiagnosisPosition {
    pub const fn get(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
        }
    }
}

impl From<DiagnosisPosition> for u8 {
    fn from(position: DiagnosisPosition) -> Self {
        position.get()
    }
}

impl TryFrom<u8> for DiagnosisPosition {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            3 => Ok(Self::Third),
            other => Err(format!("diagnosis position must be 1, 2 or 3, got {other}")),
        }
    }
}

impl fmt::Display for DiagnosisPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterDiagnosis {
    pub encounter: EncounterKey,
    pub position: DiagnosisPosition,
    /// Opaque diagnosis code (ICD-9 style, not a managed vocabulary).
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterMedication {
    pub encounter: EncounterKey,
    pub medication: CodeId,
    pub status: CodeId,
}
