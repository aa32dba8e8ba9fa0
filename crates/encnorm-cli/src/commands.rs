use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{debug, info, info_span, trace, warn};

use encnorm_ingest::{CsvRecordSource, RecordSource, load_id_mapping};
use encnorm_model::NormalizationConfig;
use encnorm_model::schema::{ColumnRole, full_layout};
use encnorm_report::{write_csv_outputs, write_json_output};
use encnorm_transform::{MemorySink, Normalizer};

use crate::cli::NormalizeArgs;
use crate::logging::redact_value;
use crate::summary::apply_table_style;
use crate::types::{NormalizeResult, OutputSelection};

/// Human-readable role of a raw column.
pub fn role_label(role: ColumnRole) -> String {
    match role {
        ColumnRole::EncounterKey => "key (encounter)".to_string(),
        ColumnRole::PatientKey => "key (patient)".to_string(),
        ColumnRole::Dimension(dimension) => format!("dimension ({dimension})"),
        ColumnRole::Counter => "counter".to_string(),
        ColumnRole::Diagnosis(position) => format!("diagnosis slot {position}"),
        ColumnRole::Medication => "medication".to_string(),
        ColumnRole::Flag => "flag".to_string(),
        ColumnRole::Text => "text".to_string(),
    }
}

/// Column name and role label for every raw column in file order.
pub fn schema_rows() -> Vec<(&'static str, String)> {
    full_layout()
        .into_iter()
        .map(|spec| (spec.name, role_label(spec.role)))
        .collect()
}

pub fn run_schema() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Column", "Role"]);
    apply_table_style(&mut table);
    for (name, role) in schema_rows() {
        table.add_row(vec![name.to_string(), role]);
    }
    println!("{table}");
    Ok(())
}

/// Resolve the run configuration: config file first, then flag overrides.
pub fn load_config(args: &NormalizeArgs) -> Result<NormalizationConfig> {
    let mut config = match &args.config {
        Some(path) if path.exists() => NormalizationConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        Some(path) => {
            warn!(path = %path.display(), "config file not found, using defaults");
            NormalizationConfig::default()
        }
        None => NormalizationConfig::default(),
    };
    if let Some(sentinel) = &args.sentinel {
        config.default_sentinel.clone_from(sentinel);
    }
    config.validate().context("validate config")?;
    Ok(config)
}

fn default_output_dir(input: &Path) -> PathBuf {
    input
        .parent()
        .map_or_else(|| PathBuf::from("output"), |parent| parent.join("output"))
}

pub fn run_normalize(args: &NormalizeArgs) -> Result<NormalizeResult> {
    let input = &args.input;
    let run_span = info_span!("run", input = %input.display());
    let _run_guard = run_span.enter();
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(input));

    let config = load_config(args)?;

    let ingest_start = Instant::now();
    let rows = info_span!("ingest")
        .in_scope(|| CsvRecordSource::new(input).read_rows())
        .with_context(|| format!("read {}", input.display()))?;
    info!(
        rows = rows.len(),
        duration_ms = ingest_start.elapsed().as_millis(),
        "ingest complete"
    );
    if let Some(first) = rows.first() {
        trace!(
            encounter = %first.encounter,
            patient = redact_value(&first.patient.to_string()),
            "first row"
        );
    }

    let mut normalizer = Normalizer::new(config);
    if let Some(path) = &args.id_mapping {
        let mapping = load_id_mapping(path)
            .with_context(|| format!("load ID mapping {}", path.display()))?;
        normalizer = normalizer.with_id_mapping(mapping);
    }

    let mut sink = MemorySink::new();
    let report = normalizer
        .run(&rows, &mut sink)
        .context("normalize encounters")?;
    for issue in &report.issues {
        debug!(
            encounter = %issue.encounter,
            kind = %issue.kind,
            message = redact_value(&issue.message),
            "row issue"
        );
    }

    let mut outputs = Vec::new();
    if args.dry_run {
        info!("dry run, no files written");
    } else {
        let selection = OutputSelection::from(args.format);
        let tables = sink.into_tables();
        let output_span = info_span!("output", output_dir = %output_dir.display());
        let output_start = Instant::now();
        output_span.in_scope(|| -> Result<()> {
            if selection.csv {
                outputs.extend(
                    write_csv_outputs(&output_dir, &tables).context("write CSV outputs")?,
                );
            }
            if selection.json {
                outputs.push(write_json_output(&output_dir, &tables).context("write JSON output")?);
            }
            Ok(())
        })?;
        info!(
            files = outputs.len(),
            duration_ms = output_start.elapsed().as_millis(),
            "output complete"
        );
    }

    Ok(NormalizeResult {
        input: input.clone(),
        output_dir,
        report,
        outputs,
        dry_run: args.dry_run,
    })
}
