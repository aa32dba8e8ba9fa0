//! End-to-end normalization run.
//!
//! Phases, each completed before the next begins:
//!
//! 1. Build every code table over the full input
//! 2. Resolve patients
//! 3. Write code tables and patients to the sink
//! 4. Normalize each row into an encounter plus its diagnoses and medications
//!
//! Failures in phases 1 to 3 abort the run. Failures in phase 4 are scoped to
//! the row: the row is skipped and recorded as a [`RowIssue`].

use std::collections::BTreeMap;
use std::time::Instant;

use encnorm_model::tables::{DIAGNOSIS_TABLE, ENCOUNTER_TABLE, MEDICATION_TABLE, PATIENT_TABLE};
use encnorm_model::{
    CodeTableSet, IdMapping, NormalizationConfig, Patient, PatientKey, RawRow, Result, RowIssue,
    RunReport,
};
use tracing::{debug, info, info_span, warn};

use crate::encounter::normalize_encounter;
use crate::normalization::{MappedNames, NameSource, TemplateNames, build_code_tables};
use crate::patient::resolve_patients;
use crate::relations::{resolve_diagnoses, resolve_medications};
use crate::sink::TableSink;

/// Runs the normalization phases against a sink.
pub struct Normalizer {
    config: NormalizationConfig,
    names: Box<dyn NameSource>,
}

impl Normalizer {
    /// Normalizer naming fixed codes from the configured templates.
    pub fn new(config: NormalizationConfig) -> Self {
        let names = Box::new(TemplateNames::new(config.name_templates.clone()));
        Self { config, names }
    }

    #[must_use]
    pub fn with_names(mut self, names: Box<dyn NameSource>) -> Self {
        self.names = names;
        self
    }

    /// Name fixed codes from an ID-mapping file, falling back to templates.
    #[must_use]
    pub fn with_id_mapping(self, mapping: IdMapping) -> Self {
        let fallback = TemplateNames::new(self.config.name_templates.clone());
        self.with_names(Box::new(MappedNames::new(mapping, fallback)))
    }

    pub fn config(&self) -> &NormalizationConfig {
        &self.config
    }

    pub fn run<S>(&self, rows: &[RawRow], sink: &mut S) -> Result<RunReport>
    where
        S: TableSink + ?Sized,
    {
        let run_span = info_span!("normalize", row_count = rows.len());
        let _run_guard = run_span.enter();
        let run_start = Instant::now();
        let mut report = RunReport {
            rows_read: rows.len(),
            ..RunReport::default()
        };

        let tables = info_span!("code_tables").in_scope(|| -> Result<CodeTableSet> {
            let start = Instant::now();
            let tables = build_code_tables(rows, &self.config, self.names.as_ref())?;
            info!(
                entry_count = tables.entry_count(),
                duration_ms = start.elapsed().as_millis(),
                "code tables built"
            );
            Ok(tables)
        })?;

        let patients = info_span!("patients").in_scope(|| -> Result<_> {
            let start = Instant::now();
            let patients = resolve_patients(rows, &tables, &self.config)?;
            info!(
                patient_count = patients.len(),
                duration_ms = start.elapsed().as_millis(),
                "patients resolved"
            );
            Ok(patients)
        })?;

        for table in tables.iter() {
            let name = table.dimension().table_name();
            for entry in table.entries() {
                let inserted = sink.upsert_code(table.dimension(), entry)?;
                report.record_write(name, inserted);
            }
        }
        for patient in patients.values() {
            let inserted = sink.upsert_patient(patient)?;
            report.record_write(PATIENT_TABLE, inserted);
        }

        info_span!("encounters").in_scope(|| {
            for row in rows {
                let written = self.write_row(row, &tables, &patients, &mut *sink, &mut report);
                if let Err(error) = written {
                    warn!(
                        encounter = %row.encounter,
                        kind = %error.kind(),
                        "row skipped"
                    );
                    report.issues.push(RowIssue::new(row.encounter, &error));
                }
            }
        });

        info!(
            row_count = rows.len(),
            encounter_count = report.table(ENCOUNTER_TABLE).map_or(0, |count| count.written),
            issue_count = report.issues.len(),
            duration_ms = run_start.elapsed().as_millis(),
            "normalization complete"
        );
        Ok(report)
    }

    /// Normalize one row completely, then write it in one sink call.
    ///
    /// Counts are recorded only once the sink accepted the whole row.
    fn write_row<S>(
        &self,
        row: &RawRow,
        tables: &CodeTableSet,
        patients: &BTreeMap<PatientKey, Patient>,
        sink: &mut S,
        report: &mut RunReport,
    ) -> Result<()>
    where
        S: TableSink + ?Sized,
    {
        let encounter = normalize_encounter(row, tables, patients, &self.config)?;
        let diagnoses = resolve_diagnoses(row, &self.config);
        let medications = resolve_medications(row, tables, &self.config)?;

        sink.insert_encounter(&encounter, &diagnoses, &medications)?;
        report.record_write(ENCOUNTER_TABLE, true);
        for _ in &diagnoses {
            report.record_write(DIAGNOSIS_TABLE, true);
        }
        for _ in &medications {
            report.record_write(MEDICATION_TABLE, true);
        }
        debug!(
            encounter = %row.encounter,
            diagnosis_count = diagnoses.len(),
            medication_count = medications.len(),
            "encounter written"
        );
        Ok(())
    }
}
