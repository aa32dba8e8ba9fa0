//! Header-indexed conversion of raw cells into [`RawRow`]s.

use std::collections::HashMap;
use std::str::FromStr;

use encnorm_model::schema::{
    ADMISSION_SOURCE_ID, ADMISSION_TYPE_ID, AGE, A1C_RESULT, CHANGE, DIABETES_MED,
    DIAGNOSIS_SLOTS, DISCHARGE_DISPOSITION_ID, ENCOUNTER_ID, GENDER, MAX_GLU_SERUM,
    MEDICAL_SPECIALTY, MEDICATION_COLUMNS, NUM_LAB_PROCEDURES, NUM_MEDICATIONS, NUM_PROCEDURES,
    NUMBER_DIAGNOSES, NUMBER_EMERGENCY, NUMBER_INPATIENT, NUMBER_OUTPATIENT, PATIENT_NBR,
    PAYER_CODE, RACE, RAW_COLUMNS, READMITTED, TIME_IN_HOSPITAL, WEIGHT,
};
use encnorm_model::{EncounterKey, MedicationCell, PatientKey, RawRow};

use crate::error::{IngestError, Result};

/// Trim whitespace and a stray byte-order mark.
pub(crate) fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Position of every known column within one file's header.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    origin: String,
    required: HashMap<&'static str, usize>,
    medications: Vec<(&'static str, Option<usize>)>,
}

impl ColumnLayout {
    /// Resolve the header. Unknown columns are ignored; medication columns
    /// may be missing, every other raw column must be present.
    pub fn from_headers<S: AsRef<str>>(headers: &[S], origin: &str) -> Result<Self> {
        let positions: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (normalize_cell(name.as_ref()), idx))
            .collect();

        let mut required = HashMap::with_capacity(RAW_COLUMNS.len());
        for spec in &RAW_COLUMNS {
            let idx = positions
                .get(spec.name)
                .copied()
                .ok_or_else(|| IngestError::MissingColumn {
                    column: spec.name.to_string(),
                    origin: origin.to_string(),
                })?;
            required.insert(spec.name, idx);
        }

        let medications: Vec<(&'static str, Option<usize>)> = MEDICATION_COLUMNS
            .iter()
            .map(|&name| (name, positions.get(name).copied()))
            .collect();
        let missing = medications.iter().filter(|(_, idx)| idx.is_none()).count();
        if missing > 0 {
            tracing::debug!(
                origin,
                missing,
                "medication columns absent, treated as not prescribed"
            );
        }

        Ok(Self {
            origin: origin.to_string(),
            required,
            medications,
        })
    }

    /// Build a row from its cells. `line` is only used in error messages.
    pub fn build_row(&self, cells: &[String], line: u64) -> Result<RawRow> {
        let cell = |column: &'static str| -> String {
            self.required
                .get(column)
                .and_then(|&idx| cells.get(idx))
                .map(|value| normalize_cell(value))
                .unwrap_or_default()
        };
        let parse_key = |column: &'static str| -> Result<String> {
            let value = cell(column);
            if value.is_empty() {
                return Err(self.invalid(line, column, &value));
            }
            Ok(value)
        };
        let counter = |column: &'static str| -> Result<Option<u32>> {
            let value = cell(column);
            if value.is_empty() {
                return Ok(None);
            }
            value
                .parse::<u32>()
                .map(Some)
                .map_err(|_| self.invalid(line, column, &value))
        };

        let encounter_raw = parse_key(ENCOUNTER_ID)?;
        let encounter = EncounterKey::from_str(&encounter_raw)
            .map_err(|_| self.invalid(line, ENCOUNTER_ID, &encounter_raw))?;
        let patient_raw = parse_key(PATIENT_NBR)?;
        let patient = PatientKey::from_str(&patient_raw)
            .map_err(|_| self.invalid(line, PATIENT_NBR, &patient_raw))?;

        let mut row = RawRow::new(encounter, patient);
        row.race = cell(RACE);
        row.gender = cell(GENDER);
        row.age = cell(AGE);
        row.weight = cell(WEIGHT);
        row.admission_type_id = cell(ADMISSION_TYPE_ID);
        row.discharge_disposition_id = cell(DISCHARGE_DISPOSITION_ID);
        row.admission_source_id = cell(ADMISSION_SOURCE_ID);
        row.time_in_hospital = counter(TIME_IN_HOSPITAL)?;
        row.payer_code = cell(PAYER_CODE);
        row.medical_specialty = cell(MEDICAL_SPECIALTY);
        row.num_lab_procedures = counter(NUM_LAB_PROCEDURES)?;
        row.num_procedures = counter(NUM_PROCEDURES)?;
        row.num_medications = counter(NUM_MEDICATIONS)?;
        row.number_outpatient = counter(NUMBER_OUTPATIENT)?;
        row.number_emergency = counter(NUMBER_EMERGENCY)?;
        row.number_inpatient = counter(NUMBER_INPATIENT)?;
        for (slot, &(column, _)) in row.diagnoses.iter_mut().zip(DIAGNOSIS_SLOTS.iter()) {
            *slot = cell(column);
        }
        row.number_diagnoses = counter(NUMBER_DIAGNOSES)?;
        row.max_glu_serum = cell(MAX_GLU_SERUM);
        row.a1c_result = cell(A1C_RESULT);
        row.medications = self
            .medications
            .iter()
            .map(|&(name, idx)| {
                let status = idx
                    .and_then(|idx| cells.get(idx))
                    .map(|value| normalize_cell(value))
                    .unwrap_or_default();
                MedicationCell::new(name, status)
            })
            .collect();
        row.change = cell(CHANGE);
        row.diabetes_med = cell(DIABETES_MED);
        row.readmitted = cell(READMITTED);
        Ok(row)
    }

    fn invalid(&self, line: u64, column: &str, value: &str) -> IngestError {
        IngestError::InvalidValue {
            origin: self.origin.clone(),
            line,
            column: column.to_string(),
            value: value.to_string(),
        }
    }
}
