//! Export of normalized tables to CSV and JSON.

use std::collections::BTreeMap;
use std::fs;

use encnorm_model::{
    CodeEntry, CodeId, DiagnosisPosition, Dimension, Encounter, EncounterDiagnosis,
    EncounterKey, EncounterMedication, NormalizedTables, Patient, PatientKey,
};
use encnorm_report::{
    JSON_FILE_NAME, encounter_frame, read_json_output, table_frames, write_csv_outputs,
    write_json_output,
};
use insta::assert_snapshot;
use tempfile::TempDir;

fn entry(id: i64, value: &str, name: Option<&str>) -> CodeEntry {
    CodeEntry {
        id: CodeId::new(id),
        value: value.to_string(),
        name: name.map(str::to_string),
    }
}

fn sample_tables() -> NormalizedTables {
    let mut codes = BTreeMap::new();
    codes.insert(
        Dimension::Race,
        vec![entry(1, "Caucasian", None), entry(2, "AfricanAmerican", None)],
    );
    codes.insert(
        Dimension::AdmissionType,
        vec![entry(1, "1", Some("Emergency")), entry(6, "6", Some("NULL"))],
    );
    codes.insert(Dimension::Medication, vec![entry(1, "insulin", None)]);
    codes.insert(Dimension::MedicationStatus, vec![entry(1, "Up", None)]);

    let encounter = Encounter {
        key: EncounterKey::new(2278392),
        patient: PatientKey::new(8222157),
        admission_type: Some(CodeId::new(6)),
        discharge_disposition: None,
        admission_source: None,
        medical_specialty: None,
        readmission: None,
        a1c_result: None,
        glucose_serum: None,
        time_in_hospital: Some(1),
        num_lab_procedures: Some(41),
        num_procedures: Some(0),
        num_medications: Some(1),
        number_outpatient: Some(0),
        number_emergency: Some(0),
        number_inpatient: Some(0),
        number_diagnoses: Some(1),
        change: Some(false),
        diabetes_med: None,
    };

    NormalizedTables {
        codes,
        patients: vec![Patient {
            key: PatientKey::new(8222157),
            race: Some(CodeId::new(1)),
            gender: None,
            age_group: None,
            payer_code: None,
            weight: None,
            source_encounter: EncounterKey::new(2278392),
        }],
        encounters: vec![encounter],
        diagnoses: vec![EncounterDiagnosis {
            encounter: EncounterKey::new(2278392),
            position: DiagnosisPosition::First,
            code: "250.83".to_string(),
        }],
        medications: vec![EncounterMedication {
            encounter: EncounterKey::new(2278392),
            medication: CodeId::new(1),
            status: CodeId::new(1),
        }],
    }
}

#[test]
fn every_table_gets_a_frame() {
    let tables = sample_tables();
    let frames = table_frames(&tables).expect("frames");
    assert_eq!(frames.len(), Dimension::ALL.len() + 4);

    let heights: Vec<(&str, usize)> = frames
        .iter()
        .map(|(name, frame)| (*name, frame.height()))
        .collect();
    assert_eq!(heights, tables.row_counts());
}

#[test]
fn encounter_frame_keeps_missing_values_null() {
    let tables = sample_tables();
    let frame = encounter_frame(&tables.encounters).expect("frame");
    assert_eq!(frame.width(), 19);
    let disposition = frame.column("discharge_disposition_id").expect("column");
    assert_eq!(disposition.null_count(), 1);
    let diabetes_med = frame.column("diabetes_med").expect("column");
    assert_eq!(diabetes_med.null_count(), 1);
}

#[test]
fn csv_export_writes_one_file_per_table() {
    let dir = TempDir::new().expect("temp dir");
    let out = dir.path().join("out");
    let tables = sample_tables();

    let written = write_csv_outputs(&out, &tables).expect("export");
    assert_eq!(written.len(), Dimension::ALL.len() + 4);
    assert!(out.join("encounter_medication.csv").exists());

    let admission_type = fs::read_to_string(out.join("admission_type.csv")).expect("read");
    assert_snapshot!(admission_type, @r"
    id,value,name
    1,1,Emergency
    6,6,NULL
    ");

    let diagnoses = fs::read_to_string(out.join("encounter_diagnosis.csv")).expect("read");
    assert_snapshot!(diagnoses, @r"
    encounter_id,position,diagnosis_code
    2278392,1,250.83
    ");
}

#[test]
fn json_export_reads_back() {
    let dir = TempDir::new().expect("temp dir");
    let tables = sample_tables();

    let path = write_json_output(dir.path(), &tables).expect("export");
    assert_eq!(path, dir.path().join(JSON_FILE_NAME));
    let restored = read_json_output(&path).expect("read back");
    assert_eq!(restored, tables);
}
