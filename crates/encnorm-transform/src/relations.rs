//! Multi-valued relations of an encounter: diagnoses and medications.

use std::collections::BTreeSet;

use encnorm_model::schema::DIAGNOSIS_SLOTS;
use encnorm_model::{
    CodeTableSet, Dimension, EncounterDiagnosis, EncounterMedication, NormalizationConfig,
    NormalizeError, RawRow, Result,
};

use crate::normalization::{SentinelPolicy, resolve_reference};

/// Diagnosis entries of a row, one per present slot.
///
/// Positions are taken from the slot literally; an absent middle slot leaves
/// a gap rather than shifting later diagnoses.
pub fn resolve_diagnoses(row: &RawRow, config: &NormalizationConfig) -> Vec<EncounterDiagnosis> {
    let policy = SentinelPolicy::new(config);
    DIAGNOSIS_SLOTS
        .iter()
        .zip(row.diagnoses.iter())
        .filter_map(|(&(column, position), raw)| {
            policy.apply(column, raw).map(|code| EncounterDiagnosis {
                encounter: row.encounter,
                position,
                code: code.to_string(),
            })
        })
        .collect()
}

/// Medication entries of a row, one per prescribed medication.
pub fn resolve_medications(
    row: &RawRow,
    tables: &CodeTableSet,
    config: &NormalizationConfig,
) -> Result<Vec<EncounterMedication>> {
    let policy = SentinelPolicy::new(config);
    let mut seen = BTreeSet::new();
    let mut medications = Vec::new();
    for cell in &row.medications {
        let Some(status) = policy.medication_status(cell) else {
            continue;
        };
        if !seen.insert(cell.medication.as_str()) {
            return Err(NormalizeError::DuplicateRelation {
                encounter: row.encounter,
                medication: cell.medication.clone(),
            });
        }
        let medication = resolve_reference(
            tables,
            Dimension::Medication,
            Some(&cell.medication),
            row.encounter,
        )?;
        let status = resolve_reference(
            tables,
            Dimension::MedicationStatus,
            Some(status),
            row.encounter,
        )?;
        if let (Some(medication), Some(status)) = (medication, status) {
            medications.push(EncounterMedication {
                encounter: row.encounter,
                medication,
                status,
            });
        }
    }
    Ok(medications)
}
