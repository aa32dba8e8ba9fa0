//! Encounter normalization: one encounter per raw row.

use std::collections::BTreeMap;

use encnorm_model::schema::{CHANGE, DIABETES_MED};
use encnorm_model::{
    CodeTableSet, Dimension, Encounter, NormalizationConfig, NormalizeError, Patient, PatientKey,
    RawRow, Result,
};

use crate::normalization::{SentinelPolicy, categorical_value, decode_flag, resolve_reference};

/// Rewrite a raw row into an encounter referencing code table ids.
///
/// Fails with [`NormalizeError::OrphanEncounter`] when the row's patient was
/// not resolved, and with [`NormalizeError::UnresolvedReference`] when a
/// present categorical value is missing from its table.
pub fn normalize_encounter(
    row: &RawRow,
    tables: &CodeTableSet,
    patients: &BTreeMap<PatientKey, Patient>,
    config: &NormalizationConfig,
) -> Result<Encounter> {
    if !patients.contains_key(&row.patient) {
        return Err(NormalizeError::OrphanEncounter {
            encounter: row.encounter,
            patient: row.patient,
        });
    }

    let policy = SentinelPolicy::new(config);
    let resolve = |dimension| {
        resolve_reference(
            tables,
            dimension,
            categorical_value(&policy, row, dimension),
            row.encounter,
        )
    };

    Ok(Encounter {
        key: row.encounter,
        patient: row.patient,
        admission_type: resolve(Dimension::AdmissionType)?,
        discharge_disposition: resolve(Dimension::DischargeDisposition)?,
        admission_source: resolve(Dimension::AdmissionSource)?,
        medical_specialty: resolve(Dimension::MedicalSpecialty)?,
        readmission: resolve(Dimension::Readmission)?,
        a1c_result: resolve(Dimension::A1cResult)?,
        glucose_serum: resolve(Dimension::GlucoseSerum)?,
        time_in_hospital: row.time_in_hospital,
        num_lab_procedures: row.num_lab_procedures,
        num_procedures: row.num_procedures,
        num_medications: row.num_medications,
        number_outpatient: row.number_outpatient,
        number_emergency: row.number_emergency,
        number_inpatient: row.number_inpatient,
        number_diagnoses: row.number_diagnoses,
        change: decode_flag(policy.apply(CHANGE, &row.change), &config.change_flag),
        diabetes_med: decode_flag(
            policy.apply(DIABETES_MED, &row.diabetes_med),
            &config.medication_flag,
        ),
    })
}

#[cfg(test)]
mod tests {
    use encnorm_model::{CodeId, EncounterKey};

    use super::*;
    use crate::normalization::{TemplateNames, build_code_tables};
    use crate::patient::resolve_patients;

    fn normalize(rows: &[RawRow]) -> Vec<Result<Encounter>> {
        let config = NormalizationConfig::new();
        let tables = build_code_tables(rows, &config, &TemplateNames::default()).unwrap();
        let patients = resolve_patients(rows, &tables, &config).unwrap();
        rows.iter()
            .map(|row| normalize_encounter(row, &tables, &patients, &config))
            .collect()
    }

    fn row(encounter: u64, change: &str) -> RawRow {
        let mut row = RawRow::new(EncounterKey::new(encounter), PatientKey::new(1));
        row.change = change.to_string();
        row
    }

    #[test]
    fn change_flag_is_tri_state() {
        let rows = [row(1, "No"), row(2, "Ch"), row(3, "Unknown"), row(4, "?")];
        let flags: Vec<Option<bool>> = normalize(&rows)
            .into_iter()
            .map(|encounter| encounter.unwrap().change)
            .collect();
        assert_eq!(flags, vec![Some(false), Some(true), None, None]);
    }

    #[test]
    fn counters_and_codes_carry_over() {
        let mut raw = row(10, "Ch");
        raw.admission_type_id = "1".to_string();
        raw.discharge_disposition_id = "25".to_string();
        raw.readmitted = "<30".to_string();
        raw.a1c_result = ">8".to_string();
        raw.max_glu_serum = "None".to_string();
        raw.diabetes_med = "Yes".to_string();
        raw.time_in_hospital = Some(3);
        raw.num_lab_procedures = Some(0);
        raw.number_inpatient = None;

        let encounter = normalize(&[raw]).remove(0).unwrap();
        assert_eq!(encounter.admission_type, Some(CodeId::new(1)));
        assert_eq!(encounter.discharge_disposition, Some(CodeId::new(25)));
        assert_eq!(encounter.admission_source, None);
        assert_eq!(encounter.readmission, Some(CodeId::new(1)));
        assert_eq!(encounter.glucose_serum, Some(CodeId::new(1)));
        assert_eq!(encounter.time_in_hospital, Some(3));
        assert_eq!(encounter.num_lab_procedures, Some(0));
        assert_eq!(encounter.number_inpatient, None);
        assert_eq!(encounter.change, Some(true));
        assert_eq!(encounter.diabetes_med, Some(true));
    }

    #[test]
    fn unknown_patient_is_orphan() {
        let raw = row(5, "No");
        let config = NormalizationConfig::new();
        let err =
            normalize_encounter(&raw, &CodeTableSet::new(), &BTreeMap::new(), &config).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::OrphanEncounter {
                encounter: EncounterKey::new(5),
                patient: PatientKey::new(1),
            }
        );
    }
}
