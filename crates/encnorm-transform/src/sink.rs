//! Table sinks receiving the normalized rows.
//!
//! Code table and patient writes are idempotent on their natural key;
//! encounter and relation writes are strict. Sinks enforce foreign keys.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use encnorm_model::tables::{DIAGNOSIS_TABLE, ENCOUNTER_TABLE, MEDICATION_TABLE, PATIENT_TABLE};
use encnorm_model::{
    CodeEntry, CodeId, CodeTableSet, DiagnosisPosition, Dimension, Encounter, EncounterDiagnosis,
    EncounterKey, EncounterMedication, NormalizedTables, Patient, PatientKey, SinkError,
};

/// Destination of a normalization run.
pub trait TableSink {
    /// Insert a code table row unless the same (id, value) pair exists.
    ///
    /// Returns whether a row was written.
    fn upsert_code(&mut self, dimension: Dimension, entry: &CodeEntry) -> Result<bool, SinkError>;

    /// Insert a patient unless its key exists. Returns whether a row was written.
    fn upsert_patient(&mut self, patient: &Patient) -> Result<bool, SinkError>;

    /// Insert an encounter together with its relation rows.
    ///
    /// Strict and all-or-nothing: on error the sink is left unchanged.
    fn insert_encounter(
        &mut self,
        encounter: &Encounter,
        diagnoses: &[EncounterDiagnosis],
        medications: &[EncounterMedication],
    ) -> Result<(), SinkError>;
}

/// In-memory sink holding the complete normalized output.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    codes: CodeTableSet,
    patients: BTreeMap<PatientKey, Patient>,
    encounters: Vec<Encounter>,
    encounter_keys: BTreeSet<EncounterKey>,
    diagnoses: Vec<EncounterDiagnosis>,
    diagnosis_keys: BTreeSet<(EncounterKey, DiagnosisPosition)>,
    medications: Vec<EncounterMedication>,
    medication_keys: BTreeSet<(EncounterKey, CodeId)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn codes(&self) -> &CodeTableSet {
        &self.codes
    }

    pub fn patient(&self, key: PatientKey) -> Option<&Patient> {
        self.patients.get(&key)
    }

    pub fn encounters(&self) -> &[Encounter] {
        &self.encounters
    }

    pub fn diagnoses(&self) -> &[EncounterDiagnosis] {
        &self.diagnoses
    }

    pub fn medications(&self) -> &[EncounterMedication] {
        &self.medications
    }

    pub fn into_tables(self) -> NormalizedTables {
        NormalizedTables {
            codes: self
                .codes
                .iter()
                .map(|table| (table.dimension(), table.entries().to_vec()))
                .collect(),
            patients: self.patients.into_values().collect(),
            encounters: self.encounters,
            diagnoses: self.diagnoses,
            medications: self.medications,
        }
    }

    fn check_code(
        &self,
        table: &'static str,
        key: &dyn fmt::Display,
        dimension: Dimension,
        id: Option<CodeId>,
    ) -> Result<(), SinkError> {
        match id {
            Some(id) if !self.codes.table(dimension).contains_id(id) => {
                Err(SinkError::MissingReference {
                    table,
                    key: key.to_string(),
                    target: dimension.table_name(),
                    reference: id.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Relation rows must point at the encounter inserted with them.
    fn check_owner(
        table: &'static str,
        key: &str,
        expected: EncounterKey,
        reference: EncounterKey,
    ) -> Result<(), SinkError> {
        if expected == reference {
            Ok(())
        } else {
            Err(SinkError::MissingReference {
                table,
                key: key.to_string(),
                target: ENCOUNTER_TABLE,
                reference: reference.to_string(),
            })
        }
    }

    fn check_encounter(&self, encounter: &Encounter) -> Result<(), SinkError> {
        if self.encounter_keys.contains(&encounter.key) {
            return Err(SinkError::DuplicateKey {
                table: ENCOUNTER_TABLE,
                key: encounter.key.to_string(),
            });
        }
        if !self.patients.contains_key(&encounter.patient) {
            return Err(SinkError::MissingReference {
                table: ENCOUNTER_TABLE,
                key: encounter.key.to_string(),
                target: PATIENT_TABLE,
                reference: encounter.patient.to_string(),
            });
        }
        for (dimension, id) in [
            (Dimension::AdmissionType, encounter.admission_type),
            (Dimension::DischargeDisposition, encounter.discharge_disposition),
            (Dimension::AdmissionSource, encounter.admission_source),
            (Dimension::MedicalSpecialty, encounter.medical_specialty),
            (Dimension::Readmission, encounter.readmission),
            (Dimension::A1cResult, encounter.a1c_result),
            (Dimension::GlucoseSerum, encounter.glucose_serum),
        ] {
            self.check_code(ENCOUNTER_TABLE, &encounter.key, dimension, id)?;
        }
        Ok(())
    }

    fn check_diagnoses(
        &self,
        encounter: EncounterKey,
        diagnoses: &[EncounterDiagnosis],
    ) -> Result<(), SinkError> {
        let mut seen = BTreeSet::new();
        for diagnosis in diagnoses {
            let key = format!("{}/{}", diagnosis.encounter, diagnosis.position);
            Self::check_owner(DIAGNOSIS_TABLE, &key, encounter, diagnosis.encounter)?;
            let natural = (diagnosis.encounter, diagnosis.position);
            if self.diagnosis_keys.contains(&natural) || !seen.insert(natural) {
                return Err(SinkError::DuplicateKey {
                    table: DIAGNOSIS_TABLE,
                    key,
                });
            }
        }
        Ok(())
    }

    fn check_medications(
        &self,
        encounter: EncounterKey,
        medications: &[EncounterMedication],
    ) -> Result<(), SinkError> {
        let mut seen = BTreeSet::new();
        for medication in medications {
            let key = format!("{}/{}", medication.encounter, medication.medication);
            Self::check_owner(MEDICATION_TABLE, &key, encounter, medication.encounter)?;
            let natural = (medication.encounter, medication.medication);
            if self.medication_keys.contains(&natural) || !seen.insert(natural) {
                return Err(SinkError::DuplicateKey {
                    table: MEDICATION_TABLE,
                    key,
                });
            }
            self.check_code(
                MEDICATION_TABLE,
                &key,
                Dimension::Medication,
                Some(medication.medication),
            )?;
            self.check_code(
                MEDICATION_TABLE,
                &key,
                Dimension::MedicationStatus,
                Some(medication.status),
            )?;
        }
        Ok(())
    }
}

impl TableSink for MemorySink {
    fn upsert_code(&mut self, dimension: Dimension, entry: &CodeEntry) -> Result<bool, SinkError> {
        self.codes
            .table_mut(dimension)
            .insert(entry.clone())
            .map_err(|conflict| SinkError::IdConflict {
                table: dimension.table_name(),
                id: conflict.id.get(),
                existing: conflict.existing,
                incoming: conflict.incoming,
            })
    }

    fn upsert_patient(&mut self, patient: &Patient) -> Result<bool, SinkError> {
        if self.patients.contains_key(&patient.key) {
            return Ok(false);
        }
        for (dimension, id) in [
            (Dimension::Race, patient.race),
            (Dimension::Gender, patient.gender),
            (Dimension::AgeGroup, patient.age_group),
        ] {
            self.check_code(PATIENT_TABLE, &patient.key, dimension, id)?;
        }
        self.patients.insert(patient.key, patient.clone());
        Ok(true)
    }

    fn insert_encounter(
        &mut self,
        encounter: &Encounter,
        diagnoses: &[EncounterDiagnosis],
        medications: &[EncounterMedication],
    ) -> Result<(), SinkError> {
        self.check_encounter(encounter)?;
        self.check_diagnoses(encounter.key, diagnoses)?;
        self.check_medications(encounter.key, medications)?;

        self.encounter_keys.insert(encounter.key);
        self.encounters.push(encounter.clone());
        for diagnosis in diagnoses {
            self.diagnosis_keys
                .insert((diagnosis.encounter, diagnosis.position));
            self.diagnoses.push(diagnosis.clone());
        }
        for medication in medications {
            self.medication_keys
                .insert((medication.encounter, medication.medication));
            self.medications.push(medication.clone());
        }
        Ok(())
    }
}
