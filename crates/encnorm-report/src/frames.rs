//! Normalized tables as polars `DataFrame`s.

use encnorm_model::tables::{DIAGNOSIS_TABLE, ENCOUNTER_TABLE, MEDICATION_TABLE, PATIENT_TABLE};
use encnorm_model::{
    CodeEntry, CodeId, Dimension, Encounter, EncounterDiagnosis, EncounterMedication,
    NormalizedTables, Patient,
};
use polars::prelude::{Column, DataFrame};

use crate::error::{ReportError, Result};

fn ids<T>(rows: &[T], get: impl Fn(&T) -> Option<CodeId>) -> Vec<Option<i64>> {
    rows.iter().map(|row| get(row).map(CodeId::get)).collect()
}

fn counters<T>(rows: &[T], get: impl Fn(&T) -> Option<u32>) -> Vec<Option<u32>> {
    rows.iter().map(get).collect()
}

fn frame(table: &'static str, columns: Vec<Column>) -> Result<DataFrame> {
    DataFrame::new(columns).map_err(|source| ReportError::Frame { table, source })
}

/// Columns `id`, `value`, `name`.
pub fn code_frame(dimension: Dimension, entries: &[CodeEntry]) -> Result<DataFrame> {
    let ids: Vec<i64> = entries.iter().map(|entry| entry.id.get()).collect();
    let values: Vec<&str> = entries.iter().map(|entry| entry.value.as_str()).collect();
    let names: Vec<Option<&str>> = entries.iter().map(|entry| entry.name.as_deref()).collect();
    frame(
        dimension.table_name(),
        vec![
            Column::new("id".into(), ids),
            Column::new("value".into(), values),
            Column::new("name".into(), names),
        ],
    )
}

pub fn patient_frame(patients: &[Patient]) -> Result<DataFrame> {
    let keys: Vec<u64> = patients.iter().map(|p| p.key.get()).collect();
    let payer: Vec<Option<&str>> = patients.iter().map(|p| p.payer_code.as_deref()).collect();
    let weight: Vec<Option<&str>> = patients.iter().map(|p| p.weight.as_deref()).collect();
    let source: Vec<u64> = patients.iter().map(|p| p.source_encounter.get()).collect();
    frame(
        PATIENT_TABLE,
        vec![
            Column::new("patient_nbr".into(), keys),
            Column::new("race_id".into(), ids(patients, |p| p.race)),
            Column::new("gender_id".into(), ids(patients, |p| p.gender)),
            Column::new("age_group_id".into(), ids(patients, |p| p.age_group)),
            Column::new("payer_code".into(), payer),
            Column::new("weight".into(), weight),
            Column::new("source_encounter_id".into(), source),
        ],
    )
}

pub fn encounter_frame(encounters: &[Encounter]) -> Result<DataFrame> {
    let keys: Vec<u64> = encounters.iter().map(|e| e.key.get()).collect();
    let patients: Vec<u64> = encounters.iter().map(|e| e.patient.get()).collect();
    let change: Vec<Option<bool>> = encounters.iter().map(|e| e.change).collect();
    let diabetes_med: Vec<Option<bool>> = encounters.iter().map(|e| e.diabetes_med).collect();
    frame(
        ENCOUNTER_TABLE,
        vec![
            Column::new("encounter_id".into(), keys),
            Column::new("patient_nbr".into(), patients),
            Column::new("admission_type_id".into(), ids(encounters, |e| e.admission_type)),
            Column::new(
                "discharge_disposition_id".into(),
                ids(encounters, |e| e.discharge_disposition),
            ),
            Column::new(
                "admission_source_id".into(),
                ids(encounters, |e| e.admission_source),
            ),
            Column::new(
                "medical_specialty_id".into(),
                ids(encounters, |e| e.medical_specialty),
            ),
            Column::new("readmission_id".into(), ids(encounters, |e| e.readmission)),
            Column::new("a1c_result_id".into(), ids(encounters, |e| e.a1c_result)),
            Column::new("glucose_serum_id".into(), ids(encounters, |e| e.glucose_serum)),
            Column::new(
                "time_in_hospital".into(),
                counters(encounters, |e| e.time_in_hospital),
            ),
            Column::new(
                "num_lab_procedures".into(),
                counters(encounters, |e| e.num_lab_procedures),
            ),
            Column::new(
                "num_procedures".into(),
                counters(encounters, |e| e.num_procedures),
            ),
            Column::new(
                "num_medications".into(),
                counters(encounters, |e| e.num_medications),
            ),
            Column::new(
                "number_outpatient".into(),
                counters(encounters, |e| e.number_outpatient),
            ),
            Column::new(
                "number_emergency".into(),
                counters(encounters, |e| e.number_emergency),
            ),
            Column::new(
                "number_inpatient".into(),
                counters(encounters, |e| e.number_inpatient),
            ),
            Column::new(
                "number_diagnoses".into(),
                counters(encounters, |e| e.number_diagnoses),
            ),
            Column::new("change".into(), change),
            Column::new("diabetes_med".into(), diabetes_med),
        ],
    )
}

pub fn diagnosis_frame(diagnoses: &[EncounterDiagnosis]) -> Result<DataFrame> {
    let encounters: Vec<u64> = diagnoses.iter().map(|d| d.encounter.get()).collect();
    let positions: Vec<u32> = diagnoses
        .iter()
        .map(|d| u32::from(d.position.get()))
        .collect();
    let codes: Vec<&str> = diagnoses.iter().map(|d| d.code.as_str()).collect();
    frame(
        DIAGNOSIS_TABLE,
        vec![
            Column::new("encounter_id".into(), encounters),
            Column::new("position".into(), positions),
            Column::new("diagnosis_code".into(), codes),
        ],
    )
}

pub fn medication_frame(medications: &[EncounterMedication]) -> Result<DataFrame> {
    let encounters: Vec<u64> = medications.iter().map(|m| m.encounter.get()).collect();
    let ids: Vec<i64> = medications.iter().map(|m| m.medication.get()).collect();
    let statuses: Vec<i64> = medications.iter().map(|m| m.status.get()).collect();
    frame(
        MEDICATION_TABLE,
        vec![
            Column::new("encounter_id".into(), encounters),
            Column::new("medication_id".into(), ids),
            Column::new("status_id".into(), statuses),
        ],
    )
}

/// Every table as a named frame: code tables first, then the entities.
pub fn table_frames(tables: &NormalizedTables) -> Result<Vec<(&'static str, DataFrame)>> {
    let mut frames = Vec::with_capacity(Dimension::ALL.len() + 4);
    for dimension in Dimension::ALL {
        frames.push((
            dimension.table_name(),
            code_frame(dimension, tables.codes(dimension))?,
        ));
    }
    frames.push((PATIENT_TABLE, patient_frame(&tables.patients)?));
    frames.push((ENCOUNTER_TABLE, encounter_frame(&tables.encounters)?));
    frames.push((DIAGNOSIS_TABLE, diagnosis_frame(&tables.diagnoses)?));
    frames.push((MEDICATION_TABLE, medication_frame(&tables.medications)?));
    Ok(frames)
}
