//! Static layout of the raw encounter file.
//!
//! The relation resolvers and the code table builder are driven by these
//! tables rather than by per-column branches.

use crate::codes::Dimension;
use crate::entity::DiagnosisPosition;

pub const ENCOUNTER_ID: &str = "encounter_id";
pub const PATIENT_NBR: &str = "patient_nbr";
pub const RACE: &str = "race";
pub const GENDER: &str = "gender";
pub const AGE: &str = "age";
pub const WEIGHT: &str = "weight";
pub const ADMISSION_TYPE_ID: &str = "admission_type_id";
pub const DISCHARGE_DISPOSITION_ID: &str = "discharge_disposition_id";
pub const ADMISSION_SOURCE_ID: &str = "admission_source_id";
pub const TIME_IN_HOSPITAL: &str = "time_in_hospital";
pub const PAYER_CODE: &str = "payer_code";
pub const MEDICAL_SPECIALTY: &str = "medical_specialty";
pub const NUM_LAB_PROCEDURES: &str = "num_lab_procedures";
pub const NUM_PROCEDURES: &str = "num_procedures";
pub const NUM_MEDICATIONS: &str = "num_medications";
pub const NUMBER_OUTPATIENT: &str = "number_outpatient";
pub const NUMBER_EMERGENCY: &str = "number_emergency";
pub const NUMBER_INPATIENT: &str = "number_inpatient";
pub const DIAG_1: &str = "diag_1";
pub const DIAG_2: &str = "diag_2";
pub const DIAG_3: &str = "diag_3";
pub const NUMBER_DIAGNOSES: &str = "number_diagnoses";
pub const MAX_GLU_SERUM: &str = "max_glu_serum";
pub const A1C_RESULT: &str = "A1Cresult";
pub const CHANGE: &str = "change";
pub const DIABETES_MED: &str = "diabetesMed";
pub const READMITTED: &str = "readmitted";

/// Role a raw column plays in the normalized model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    EncounterKey,
    PatientKey,
    Dimension(Dimension),
    Counter,
    Diagnosis(DiagnosisPosition),
    Medication,
    Flag,
    Text,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub role: ColumnRole,
}

const fn column(name: &'static str, role: ColumnRole) -> ColumnSpec {
    ColumnSpec { name, role }
}

/// Single-column categorical dimensions, in the order their tables are built.
pub const CATEGORICAL_COLUMNS: [(&str, Dimension); 10] = [
    (RACE, Dimension::Race),
    (GENDER, Dimension::Gender),
    (AGE, Dimension::AgeGroup),
    (ADMISSION_TYPE_ID, Dimension::AdmissionType),
    (DISCHARGE_DISPOSITION_ID, Dimension::DischargeDisposition),
    (ADMISSION_SOURCE_ID, Dimension::AdmissionSource),
    (MEDICAL_SPECIALTY, Dimension::MedicalSpecialty),
    (READMITTED, Dimension::Readmission),
    (A1C_RESULT, Dimension::A1cResult),
    (MAX_GLU_SERUM, Dimension::GlucoseSerum),
];

/// Raw column backing a single-column dimension.
pub fn column_for(dimension: Dimension) -> Option<&'static str> {
    CATEGORICAL_COLUMNS
        .iter()
        .find(|(_, candidate)| *candidate == dimension)
        .map(|(name, _)| *name)
}

/// Diagnosis columns and the position they occupy.
pub const DIAGNOSIS_SLOTS: [(&str, DiagnosisPosition); 3] = [
    (DIAG_1, DiagnosisPosition::First),
    (DIAG_2, DiagnosisPosition::Second),
    (DIAG_3, DiagnosisPosition::Third),
];

/// Medication status columns; the header is the medication name.
pub const MEDICATION_COLUMNS: [&str; 23] = [
    "metformin",
    "repaglinide",
    "nateglinide",
    "chlorpropamide",
    "glimepiride",
    "acetohexamide",
    "glipizide",
    "glyburide",
    "tolbutamide",
    "pioglitazone",
    "rosiglitazone",
    "acarbose",
    "miglitol",
    "troglitazone",
    "tolazamide",
    "examide",
    "citoglipton",
    "insulin",
    "glyburide-metformin",
    "glipizide-metformin",
    "glimepiride-pioglitazone",
    "metformin-rosiglitazone",
    "metformin-pioglitazone",
];

/// Non-medication columns in file order.
pub const RAW_COLUMNS: [ColumnSpec; 27] = [
    column(ENCOUNTER_ID, ColumnRole::EncounterKey),
    column(PATIENT_NBR, ColumnRole::PatientKey),
    column(RACE, ColumnRole::Dimension(Dimension::Race)),
    column(GENDER, ColumnRole::Dimension(Dimension::Gender)),
    column(AGE, ColumnRole::Dimension(Dimension::AgeGroup)),
    column(WEIGHT, ColumnRole::Text),
    column(ADMISSION_TYPE_ID, ColumnRole::Dimension(Dimension::AdmissionType)),
    column(
        DISCHARGE_DISPOSITION_ID,
        ColumnRole::Dimension(Dimension::DischargeDisposition),
    ),
    column(ADMISSION_SOURCE_ID, ColumnRole::Dimension(Dimension::AdmissionSource)),
    column(TIME_IN_HOSPITAL, ColumnRole::Counter),
    column(PAYER_CODE, ColumnRole::Text),
    column(MEDICAL_SPECIALTY, ColumnRole::Dimension(Dimension::MedicalSpecialty)),
    column(NUM_LAB_PROCEDURES, ColumnRole::Counter),
    column(NUM_PROCEDURES, ColumnRole::Counter),
    column(NUM_MEDICATIONS, ColumnRole::Counter),
    column(NUMBER_OUTPATIENT, ColumnRole::Counter),
    column(NUMBER_EMERGENCY, ColumnRole::Counter),
    column(NUMBER_INPATIENT, ColumnRole::Counter),
    column(DIAG_1, ColumnRole::Diagnosis(DiagnosisPosition::First)),
    column(DIAG_2, ColumnRole::Diagnosis(DiagnosisPosition::Second)),
    column(DIAG_3, ColumnRole::Diagnosis(DiagnosisPosition::Third)),
    column(NUMBER_DIAGNOSES, ColumnRole::Counter),
    column(MAX_GLU_SERUM, ColumnRole::Dimension(Dimension::GlucoseSerum)),
    column(A1C_RESULT, ColumnRole::Dimension(Dimension::A1cResult)),
    column(CHANGE, ColumnRole::Flag),
    column(DIABETES_MED, ColumnRole::Flag),
    column(READMITTED, ColumnRole::Dimension(Dimension::Readmission)),
];

/// Full column layout including the medication block, which sits between
/// `A1Cresult` and `change` in the file.
pub fn full_layout() -> Vec<ColumnSpec> {
    let split = RAW_COLUMNS
        .iter()
        .position(|spec| spec.name == CHANGE)
        .unwrap_or(RAW_COLUMNS.len());
    let mut layout = Vec::with_capacity(RAW_COLUMNS.len() + MEDICATION_COLUMNS.len());
    layout.extend_from_slice(&RAW_COLUMNS[..split]);
    layout.extend(
        MEDICATION_COLUMNS
            .iter()
            .map(|&name| column(name, ColumnRole::Medication)),
    );
    layout.extend_from_slice(&RAW_COLUMNS[split..]);
    layout
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_layout_has_fifty_columns() {
        let layout = full_layout();
        assert_eq!(layout.len(), 50);
        assert_eq!(layout[0].name, ENCOUNTER_ID);
        assert_eq!(layout[24].name, "metformin");
        assert_eq!(layout[47].name, CHANGE);
        assert_eq!(layout[49].name, READMITTED);
    }

    #[test]
    fn categorical_columns_match_layout_roles() {
        for (name, dimension) in CATEGORICAL_COLUMNS {
            let spec = RAW_COLUMNS
                .iter()
                .find(|spec| spec.name == name)
                .unwrap();
            assert_eq!(spec.role, ColumnRole::Dimension(dimension));
            assert_eq!(column_for(dimension), Some(name));
        }
        assert_eq!(column_for(Dimension::Medication), None);
    }
}
