//! Patient resolution: one patient per external patient key.
//!
//! Resolution is a grouping pass followed by a min-by-key reduction. The row
//! with the lowest encounter key supplies the demographics, so the outcome
//! does not depend on row order.

use std::collections::BTreeMap;

use encnorm_model::schema::{PAYER_CODE, WEIGHT};
use encnorm_model::{
    CodeTableSet, Dimension, NormalizationConfig, Patient, PatientKey, RawRow, Result,
};

use crate::normalization::{SentinelPolicy, categorical_value, resolve_reference};

/// Group rows by external patient key, keeping input order within a group.
pub fn group_by_patient(rows: &[RawRow]) -> BTreeMap<PatientKey, Vec<&RawRow>> {
    let mut groups: BTreeMap<PatientKey, Vec<&RawRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.patient).or_default().push(row);
    }
    groups
}

/// Row with the minimum encounter key.
pub fn representative<'a>(group: &[&'a RawRow]) -> Option<&'a RawRow> {
    group.iter().copied().min_by_key(|row| row.encounter)
}

/// Build a patient from its representative row.
pub fn build_patient(
    row: &RawRow,
    tables: &CodeTableSet,
    policy: &SentinelPolicy<'_>,
) -> Result<Patient> {
    let resolve = |dimension| {
        resolve_reference(
            tables,
            dimension,
            categorical_value(policy, row, dimension),
            row.encounter,
        )
    };
    Ok(Patient {
        key: row.patient,
        race: resolve(Dimension::Race)?,
        gender: resolve(Dimension::Gender)?,
        age_group: resolve(Dimension::AgeGroup)?,
        payer_code: policy.text(PAYER_CODE, &row.payer_code),
        weight: policy.text(WEIGHT, &row.weight),
        source_encounter: row.encounter,
    })
}

/// Resolve every distinct patient in the input.
pub fn resolve_patients(
    rows: &[RawRow],
    tables: &CodeTableSet,
    config: &NormalizationConfig,
) -> Result<BTreeMap<PatientKey, Patient>> {
    let policy = SentinelPolicy::new(config);
    let mut patients = BTreeMap::new();
    for (key, group) in group_by_patient(rows) {
        if let Some(row) = representative(&group) {
            patients.insert(key, build_patient(row, tables, &policy)?);
        }
    }
    Ok(patients)
}

#[cfg(test)]
mod tests {
    use encnorm_model::{CodeId, EncounterKey, NormalizeError};

    use super::*;
    use crate::normalization::{TemplateNames, build_code_tables};

    fn row(encounter: u64, patient: u64) -> RawRow {
        RawRow::new(EncounterKey::new(encounter), PatientKey::new(patient))
    }

    #[test]
    fn representative_is_min_encounter_key() {
        let rows = [row(300, 1), row(20, 1), row(100, 1)];
        let refs: Vec<&RawRow> = rows.iter().collect();
        assert_eq!(
            representative(&refs).map(|r| r.encounter),
            Some(EncounterKey::new(20))
        );
        assert!(representative(&[]).is_none());
    }

    #[test]
    fn groups_keep_every_row() {
        let rows = [row(1, 9), row(2, 8), row(3, 9)];
        let groups = group_by_patient(&rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&PatientKey::new(9)].len(), 2);
    }

    #[test]
    fn earliest_encounter_supplies_demographics() {
        let mut later = row(100, 7);
        later.race = "Caucasian".to_string();
        later.gender = "Female".to_string();
        later.age = "[70-80)".to_string();
        later.weight = "[75-100)".to_string();
        let mut earlier = row(50, 7);
        earlier.race = "?".to_string();
        earlier.gender = "Female".to_string();
        earlier.age = "[70-80)".to_string();
        earlier.weight = "?".to_string();
        earlier.payer_code = "MC".to_string();

        let rows = [later, earlier];
        let config = NormalizationConfig::new();
        let tables = build_code_tables(&rows, &config, &TemplateNames::default()).unwrap();
        let patients = resolve_patients(&rows, &tables, &config).unwrap();

        let patient = &patients[&PatientKey::new(7)];
        assert_eq!(patient.source_encounter, EncounterKey::new(50));
        assert_eq!(patient.race, None);
        assert_eq!(patient.gender, tables.id_of(Dimension::Gender, "Female"));
        assert_eq!(patient.age_group, Some(CodeId::new(1)));
        assert_eq!(patient.weight, None);
        assert_eq!(patient.payer_code.as_deref(), Some("MC"));
    }

    #[test]
    fn value_missing_from_tables_is_unresolved() {
        let mut only = row(1, 1);
        only.race = "Martian".to_string();
        let err = resolve_patients(&[only], &CodeTableSet::new(), &NormalizationConfig::new())
            .unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::UnresolvedReference {
                dimension: Dimension::Race,
                ..
            }
        ));
    }
}
