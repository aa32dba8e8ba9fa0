//! Raw, denormalized input rows.
//!
//! Text fields hold the cell exactly as read (trimmed). Sentinel tokens are
//! not interpreted here; that is the job of the sentinel policy in the
//! transform crate.

use serde::{Deserialize, Serialize};

use crate::codes::Dimension;
use crate::ids::{EncounterKey, PatientKey};

/// Status cell of one medication column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationCell {
    /// Medication name (the raw column header).
    pub medication: String,
    /// Raw status token, e.g. `No`, `Steady`, `Up`, `Down`.
    pub status: String,
}

impl MedicationCell {
    pub fn new(medication: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            medication: medication.into(),
            status: status.into(),
        }
    }
}

/// One row of the raw encounter file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub encounter: EncounterKey,
    pub patient: PatientKey,
    pub race: String,
    pub gender: String,
    pub age: String,
    pub weight: String,
    pub admission_type_id: String,
    pub discharge_disposition_id: String,
    pub admission_source_id: String,
    pub time_in_hospital: Option<u32>,
    pub payer_code: String,
    pub medical_specialty: String,
    pub num_lab_procedures: Option<u32>,
    pub num_procedures: Option<u32>,
    pub num_medications: Option<u32>,
    pub number_outpatient: Option<u32>,
    pub number_emergency: Option<u32>,
    pub number_inpatient: Option<u32>,
    /// `diag_1`, `diag_2`, `diag_3` in slot order.
    pub diagnoses: [String; 3],
    pub number_diagnoses: Option<u32>,
    pub max_glu_serum: String,
    pub a1c_result: String,
    /// One cell per medication column, in file column order.
    pub medications: Vec<MedicationCell>,
    pub change: String,
    pub diabetes_med: String,
    pub readmitted: String,
}

impl RawRow {
    /// A row with the given keys and every other cell empty.
    pub fn new(encounter: EncounterKey, patient: PatientKey) -> Self {
        Self {
            encounter,
            patient,
            race: String::new(),
            gender: String::new(),
            age: String::new(),
            weight: String::new(),
            admission_type_id: String::new(),
            discharge_disposition_id: String::new(),
            admission_source_id: String::new(),
            time_in_hospital: None,
            payer_code: String::new(),
            medical_specialty: String::new(),
            num_lab_procedures: None,
            num_procedures: None,
            num_medications: None,
            number_outpatient: None,
            number_emergency: None,
            number_inpatient: None,
            diagnoses: [String::new(), String::new(), String::new()],
            number_diagnoses: None,
            max_glu_serum: String::new(),
            a1c_result: String::new(),
            medications: Vec::new(),
            change: String::new(),
            diabetes_med: String::new(),
            readmitted: String::new(),
        }
    }

    /// Raw cell backing a single-column categorical dimension.
    ///
    /// Returns `None` for the medication dimensions, which are spread over
    /// the medication columns instead.
    pub fn categorical(&self, dimension: Dimension) -> Option<&str> {
        let value = match dimension {
            Dimension::Race => &self.race,
            Dimension::Gender => &self.gender,
            Dimension::AgeGroup => &self.age,
            Dimension::AdmissionType => &self.admission_type_id,
            Dimension::DischargeDisposition => &self.discharge_disposition_id,
            Dimension::AdmissionSource => &self.admission_source_id,
            Dimension::MedicalSpecialty => &self.medical_specialty,
            Dimension::Readmission => &self.readmitted,
            Dimension::A1cResult => &self.a1c_result,
            Dimension::GlucoseSerum => &self.max_glu_serum,
            Dimension::Medication | Dimension::MedicationStatus => return None,
        };
        Some(value.as_str())
    }
}
