//! End-to-end tests of the `normalize` and `schema` commands.

use std::fs;
use std::path::{Path, PathBuf};

use encnorm_cli::cli::{NormalizeArgs, OutputFormatArg};
use encnorm_cli::commands::{load_config, run_normalize, schema_rows};
use encnorm_cli::summary::{issue_table, table_summary};
use encnorm_model::schema::full_layout;
use encnorm_model::{ErrorKind, NormalizedTables};
use insta::assert_snapshot;
use tempfile::TempDir;

fn data_line(encounter: u64, patient: u64, race: &str) -> String {
    full_layout()
        .iter()
        .map(|spec| match spec.name {
            "encounter_id" => encounter.to_string(),
            "patient_nbr" => patient.to_string(),
            "race" => race.to_string(),
            "gender" => "Female".to_string(),
            "age" => "[0-10)".to_string(),
            "weight" => "?".to_string(),
            "admission_type_id" => "6".to_string(),
            "discharge_disposition_id" => "25".to_string(),
            "admission_source_id" => "1".to_string(),
            "payer_code" => "?".to_string(),
            "medical_specialty" => "Pediatrics-Endocrinology".to_string(),
            "diag_1" => "250.83".to_string(),
            "diag_2" => "?".to_string(),
            "diag_3" => "?".to_string(),
            "max_glu_serum" => "None".to_string(),
            "A1Cresult" => "None".to_string(),
            "change" => "No".to_string(),
            "diabetesMed" => "No".to_string(),
            "readmitted" => "NO".to_string(),
            "time_in_hospital" | "num_lab_procedures" | "num_procedures" | "num_medications"
            | "number_outpatient" | "number_emergency" | "number_inpatient"
            | "number_diagnoses" => "1".to_string(),
            _ => "No".to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn write_input(dir: &Path, lines: &[String]) -> PathBuf {
    let header = full_layout()
        .iter()
        .map(|spec| spec.name)
        .collect::<Vec<_>>()
        .join(",");
    let path = dir.join("diabetic_data.csv");
    let mut content = header;
    for line in lines {
        content.push('\n');
        content.push_str(line);
    }
    content.push('\n');
    fs::write(&path, content).expect("write input");
    path
}

fn args(input: PathBuf, output_dir: PathBuf) -> NormalizeArgs {
    NormalizeArgs {
        input,
        output_dir: Some(output_dir),
        format: OutputFormatArg::Both,
        dry_run: false,
        config: None,
        id_mapping: None,
        sentinel: None,
    }
}

#[test]
fn normalize_writes_csv_and_json() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(
        dir.path(),
        &[
            data_line(2278392, 8222157, "Caucasian"),
            data_line(149190, 55629189, "?"),
        ],
    );
    let out = dir.path().join("out");

    let result = run_normalize(&args(input, out.clone())).expect("normalize");
    assert!(!result.has_issues());
    assert_eq!(result.report.rows_read, 2);
    assert!(out.join("encounter.csv").exists());
    assert!(out.join("normalized.json").exists());

    let json = fs::read_to_string(out.join("normalized.json")).expect("read json");
    let tables: NormalizedTables = serde_json::from_str(&json).expect("parse json");
    assert_eq!(tables.patients.len(), 2);
    assert_eq!(tables.encounters.len(), 2);
    // "?" race is missing, so only one race entry.
    assert_eq!(tables.codes(encnorm_model::Dimension::Race).len(), 1);
}

#[test]
fn dry_run_writes_nothing() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(dir.path(), &[data_line(12522, 48330783, "Caucasian")]);
    let out = dir.path().join("out");
    let mut args = args(input, out.clone());
    args.dry_run = true;

    let result = run_normalize(&args).expect("normalize");
    assert!(result.outputs.is_empty());
    assert!(!out.exists());
}

#[test]
fn duplicate_encounter_becomes_row_issue() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(
        dir.path(),
        &[
            data_line(64410, 86047875, "AfricanAmerican"),
            data_line(64410, 86047875, "AfricanAmerican"),
        ],
    );
    let mut args = args(input, dir.path().join("out"));
    args.format = OutputFormatArg::Csv;

    let result = run_normalize(&args).expect("normalize");
    assert!(result.has_issues());
    assert_eq!(result.report.issues.len(), 1);
    assert_eq!(result.report.issues[0].kind, ErrorKind::DuplicateKey);
    assert!(issue_table(&result.report.issues).is_some());
    assert!(table_summary(&result.report).to_string().contains("TOTAL"));
}

#[test]
fn missing_input_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let err = run_normalize(&args(dir.path().join("absent.csv"), dir.path().join("out")))
        .unwrap_err();
    assert!(format!("{err:#}").contains("absent.csv"));
}

#[test]
fn config_file_and_sentinel_flag() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("encnorm.toml");
    fs::write(
        &config_path,
        "not_prescribed = \"Off\"\n[sentinels]\nmax_glu_serum = \"None\"\n",
    )
    .expect("write config");

    let mut args = args(dir.path().join("in.csv"), dir.path().join("out"));
    args.config = Some(config_path);
    args.sentinel = Some("NA".to_string());
    let config = load_config(&args).expect("config");
    assert_eq!(config.not_prescribed, "Off");
    assert_eq!(config.sentinel_for("max_glu_serum"), "None");
    assert_eq!(config.sentinel_for("race"), "NA");

    args.config = Some(dir.path().join("absent.toml"));
    args.sentinel = None;
    let defaults = load_config(&args).expect("defaults");
    assert_eq!(defaults.default_sentinel, "?");
}

#[test]
fn schema_listing() {
    let listing = schema_rows()
        .into_iter()
        .map(|(name, role)| format!("{name}: {role}"))
        .collect::<Vec<_>>()
        .join("\n");
    assert_snapshot!(listing, @r"
    encounter_id: key (encounter)
    patient_nbr: key (patient)
    race: dimension (race)
    gender: dimension (gender)
    age: dimension (age_group)
    weight: text
    admission_type_id: dimension (admission_type)
    discharge_disposition_id: dimension (discharge_disposition)
    admission_source_id: dimension (admission_source)
    time_in_hospital: counter
    payer_code: text
    medical_specialty: dimension (medical_specialty)
    num_lab_procedures: counter
    num_procedures: counter
    num_medications: counter
    number_outpatient: counter
    number_emergency: counter
    number_inpatient: counter
    diag_1: diagnosis slot 1
    diag_2: diagnosis slot 2
    diag_3: diagnosis slot 3
    number_diagnoses: counter
    max_glu_serum: dimension (glucose_serum)
    A1Cresult: dimension (a1c_result)
    metformin: medication
    repaglinide: medication
    nateglinide: medication
    chlorpropamide: medication
    glimepiride: medication
    acetohexamide: medication
    glipizide: medication
    glyburide: medication
    tolbutamide: medication
    pioglitazone: medication
    rosiglitazone: medication
    acarbose: medication
    miglitol: medication
    troglitazone: medication
    tolazamide: medication
    examide: medication
    citoglipton: medication
    insulin: medication
    glyburide-metformin: medication
    glipizide-metformin: medication
    glimepiride-pioglitazone: medication
    metformin-rosiglitazone: medication
    metformin-pioglitazone: medication
    change: flag
    diabetesMed: flag
    readmitted: dimension (readmission)
    ");
}
