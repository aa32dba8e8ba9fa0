//! Tests for encnorm-model types.

use encnorm_model::{
    CodeId, Dimension, EncounterKey, ErrorKind, NormalizeError, PatientKey, RowIssue, RunReport,
    SinkError,
};

#[test]
fn run_report_counts() {
    let mut report = RunReport::default();
    report.record_write("race", true);
    report.record_write("race", true);
    report.record_write("race", false);
    report.record_write("encounter", true);

    let race = report.table("race").expect("race count");
    assert_eq!(race.written, 2);
    assert_eq!(race.skipped, 1);
    assert_eq!(report.table("encounter").map(|c| c.written), Some(1));
    assert!(report.table("patient").is_none());
    assert!(!report.has_issues());
}

#[test]
fn row_issue_captures_kind_and_message() {
    let error = NormalizeError::OrphanEncounter {
        encounter: EncounterKey::new(12522),
        patient: PatientKey::new(48330783),
    };
    let issue = RowIssue::new(EncounterKey::new(12522), &error);
    assert_eq!(issue.kind, ErrorKind::OrphanEncounter);
    assert_eq!(
        issue.message,
        "encounter 12522 references unresolved patient 48330783"
    );
}

#[test]
fn issue_counts_group_by_kind() {
    let mut report = RunReport::default();
    let unresolved = NormalizeError::UnresolvedReference {
        encounter: EncounterKey::new(1),
        dimension: Dimension::Race,
        value: "Martian".to_string(),
    };
    let duplicate = NormalizeError::Sink(SinkError::DuplicateKey {
        table: "encounter",
        key: "1".to_string(),
    });
    report.issues.push(RowIssue::new(EncounterKey::new(1), &unresolved));
    report.issues.push(RowIssue::new(EncounterKey::new(2), &unresolved));
    report.issues.push(RowIssue::new(EncounterKey::new(1), &duplicate));

    let counts = report.issue_counts();
    assert_eq!(counts.get(&ErrorKind::UnresolvedReference), Some(&2));
    assert_eq!(counts.get(&ErrorKind::DuplicateKey), Some(&1));
    assert!(report.has_issues());
}

#[test]
fn report_serializes() {
    let mut report = RunReport {
        rows_read: 3,
        ..RunReport::default()
    };
    report.record_write("patient", true);
    let json = serde_json::to_string(&report).expect("serialize report");
    let round: RunReport = serde_json::from_str(&json).expect("deserialize report");
    assert_eq!(round.rows_read, 3);
    assert_eq!(round.tables, report.tables);
}

#[test]
fn domain_inconsistency_message_names_both_values() {
    let error = NormalizeError::DomainInconsistency {
        dimension: Dimension::DischargeDisposition,
        code: 11,
        existing: "Expired".to_string(),
        conflicting: "Discharge disposition 11".to_string(),
    };
    assert_eq!(error.kind(), ErrorKind::DomainInconsistency);
    assert_eq!(
        error.to_string(),
        "discharge_disposition code 11 observed with conflicting names \"Expired\" and \"Discharge disposition 11\""
    );
    assert_eq!(CodeId::new(11).to_string(), "11");
}
