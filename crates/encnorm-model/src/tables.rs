//! The normalized output as a whole.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codes::{CodeEntry, Dimension};
use crate::entity::{Encounter, EncounterDiagnosis, EncounterMedication, Patient};

pub const PATIENT_TABLE: &str = "patient";
pub const ENCOUNTER_TABLE: &str = "encounter";
pub const DIAGNOSIS_TABLE: &str = "encounter_diagnosis";
pub const MEDICATION_TABLE: &str = "encounter_medication";

/// Every table produced by a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTables {
    /// Code table rows per dimension, in id assignment order.
    pub codes: BTreeMap<Dimension, Vec<CodeEntry>>,
    /// Patients ordered by patient key.
    pub patients: Vec<Patient>,
    /// Encounters in input order.
    pub encounters: Vec<Encounter>,
    pub diagnoses: Vec<EncounterDiagnosis>,
    pub medications: Vec<EncounterMedication>,
}

impl NormalizedTables {
    pub fn codes(&self, dimension: Dimension) -> &[CodeEntry] {
        self.codes
            .get(&dimension)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Row count per table name.
    pub fn row_counts(&self) -> Vec<(&'static str, usize)> {
        let mut counts: Vec<(&'static str, usize)> = Dimension::ALL
            .iter()
            .map(|&dimension| (dimension.table_name(), self.codes(dimension).len()))
            .collect();
        counts.push((PATIENT_TABLE, self.patients.len()));
        counts.push((ENCOUNTER_TABLE, self.encounters.len()));
        counts.push((DIAGNOSIS_TABLE, self.diagnoses.len()));
        counts.push((MEDICATION_TABLE, self.medications.len()));
        counts
    }
}
