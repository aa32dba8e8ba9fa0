//! End-to-end normalization scenarios over small hand-written inputs.

use encnorm_model::{
    CodeId, DiagnosisPosition, Dimension, EncounterKey, ErrorKind, MedicationCell,
    NormalizationConfig, NormalizeError, PatientKey, RawRow,
};
use encnorm_transform::normalization::{FixedCodeTableBuilder, TemplateNames};
use encnorm_transform::{MemorySink, NameSource, Normalizer, resolve_diagnoses};

fn raw(encounter: u64, patient: u64) -> RawRow {
    RawRow::new(EncounterKey::new(encounter), PatientKey::new(patient))
}

fn run(rows: &[RawRow]) -> (encnorm_model::RunReport, MemorySink) {
    let mut sink = MemorySink::new();
    let report = Normalizer::new(NormalizationConfig::new())
        .run(rows, &mut sink)
        .expect("run");
    (report, sink)
}

#[test]
fn patient_demographics_come_from_lowest_encounter() {
    let mut later = raw(100, 7);
    later.race = "Caucasian".to_string();
    later.gender = "Female".to_string();
    later.age = "[70-80)".to_string();
    later.change = "Ch".to_string();
    later.diabetes_med = "Yes".to_string();
    let mut earlier = raw(50, 7);
    earlier.race = "?".to_string();
    earlier.gender = "Female".to_string();
    earlier.age = "[70-80)".to_string();

    let (report, sink) = run(&[later, earlier]);
    assert!(!report.has_issues());

    let patient = sink.patient(PatientKey::new(7)).expect("patient 7");
    assert_eq!(patient.source_encounter, EncounterKey::new(50));
    assert_eq!(patient.race, None);
    let female = sink
        .codes()
        .table(Dimension::Gender)
        .get(patient.gender.expect("gender"))
        .map(|entry| entry.value.clone());
    assert_eq!(female.as_deref(), Some("Female"));

    // The race table still holds the value seen on the later encounter.
    assert_eq!(
        sink.codes().id_of(Dimension::Race, "Caucasian"),
        Some(CodeId::new(1))
    );
}

#[test]
fn absent_diagnosis_slot_is_omitted_not_renumbered() {
    let mut row = raw(1, 1);
    row.diagnoses = ["250.83".to_string(), "?".to_string(), "401".to_string()];

    let positions: Vec<DiagnosisPosition> = resolve_diagnoses(&row, &NormalizationConfig::new())
        .into_iter()
        .map(|diagnosis| diagnosis.position)
        .collect();
    assert_eq!(
        positions,
        vec![DiagnosisPosition::First, DiagnosisPosition::Third]
    );

    let (_, sink) = run(&[row]);
    assert_eq!(sink.diagnoses().len(), 2);
    assert_eq!(sink.diagnoses()[1].code, "401");
}

#[test]
fn change_flag_maps_three_ways() {
    let rows: Vec<RawRow> = [(1, "No"), (2, "Ch"), (3, "Unknown")]
        .into_iter()
        .map(|(encounter, change)| {
            let mut row = raw(encounter, 1);
            row.change = change.to_string();
            row
        })
        .collect();

    let (_, sink) = run(&rows);
    let flags: Vec<Option<bool>> = sink.encounters().iter().map(|e| e.change).collect();
    assert_eq!(flags, vec![Some(false), Some(true), None]);
}

#[test]
fn differing_names_for_one_disposition_code_fail() {
    let names = TemplateNames::default();
    let mut builder = FixedCodeTableBuilder::new(Dimension::DischargeDisposition, &names);
    builder.observe(11, "Expired").expect("first name");
    let err = builder
        .observe(11, "Expired at home")
        .expect_err("conflicting name");
    assert_eq!(
        err,
        NormalizeError::DomainInconsistency {
            dimension: Dimension::DischargeDisposition,
            code: 11,
            existing: "Expired".to_string(),
            conflicting: "Expired at home".to_string(),
        }
    );
}

struct PerCallNames;

impl NameSource for PerCallNames {
    fn name_for(&self, dimension: Dimension, code: i64) -> String {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let call = CALLS.fetch_add(1, Ordering::Relaxed);
        format!("{dimension} {code} #{call}")
    }
}

#[test]
fn inconsistent_name_source_aborts_the_run() {
    let mut first = raw(1, 1);
    first.discharge_disposition_id = "11".to_string();
    let mut second = raw(2, 2);
    second.discharge_disposition_id = "11".to_string();

    let mut sink = MemorySink::new();
    let err = Normalizer::new(NormalizationConfig::new())
        .with_names(Box::new(PerCallNames))
        .run(&[first, second], &mut sink)
        .expect_err("domain inconsistency");
    assert_eq!(err.kind(), ErrorKind::DomainInconsistency);
    assert!(sink.encounters().is_empty());
}

#[test]
fn row_issues_do_not_stop_the_run() {
    let mut good = raw(1, 1);
    good.medications = vec![MedicationCell::new("insulin", "Up")];
    let mut merged = raw(2, 1);
    merged.medications = vec![
        MedicationCell::new("metformin", "Steady"),
        MedicationCell::new("metformin", "Down"),
    ];
    let duplicate = raw(1, 1);
    let tail = raw(3, 2);

    let (report, sink) = run(&[good, merged, duplicate, tail]);
    let counts = report.issue_counts();
    assert_eq!(counts.get(&ErrorKind::DuplicateRelation), Some(&1));
    assert_eq!(counts.get(&ErrorKind::DuplicateKey), Some(&1));
    let written: Vec<u64> = sink.encounters().iter().map(|e| e.key.get()).collect();
    assert_eq!(written, vec![1, 3]);
    assert_eq!(sink.medications().len(), 1);
}

#[test]
fn per_column_sentinel_override() {
    let mut row = raw(1, 1);
    row.max_glu_serum = "None".to_string();
    row.a1c_result = "None".to_string();
    let config = NormalizationConfig::new().with_sentinel("max_glu_serum", "None");

    let mut sink = MemorySink::new();
    Normalizer::new(config).run(&[row], &mut sink).expect("run");
    let encounter = &sink.encounters()[0];
    assert_eq!(encounter.glucose_serum, None);
    assert_eq!(encounter.a1c_result, Some(CodeId::new(1)));
}
