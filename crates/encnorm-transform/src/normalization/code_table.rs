//! Code table construction and reference resolution.
//!
//! One generic builder serves every engine-assigned dimension; the three
//! fixed-code dimensions go through [`FixedCodeTableBuilder`], which keeps the
//! external code as surrogate id and checks name consistency.

use encnorm_model::schema::{CATEGORICAL_COLUMNS, column_for};
use encnorm_model::{
    CodeEntry, CodeId, CodeTable, CodeTableSet, Dimension, EncounterKey, IdPolicy,
    NormalizationConfig, NormalizeError, RawRow, Result,
};
use tracing::debug;

use super::names::NameSource;
use super::sentinel::SentinelPolicy;

/// Builder for a dimension whose ids are assigned in first-seen order.
#[derive(Debug, Clone)]
pub struct CodeTableBuilder {
    table: CodeTable,
}

impl CodeTableBuilder {
    pub fn new(dimension: Dimension) -> Self {
        Self {
            table: CodeTable::new(dimension),
        }
    }

    pub fn observe(&mut self, value: &str) -> CodeId {
        self.table.intern(value)
    }

    /// Observe every present value; absent values are not part of the domain.
    pub fn extend<'a, I>(&mut self, values: I)
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        for value in values.into_iter().flatten() {
            self.observe(value);
        }
    }

    pub fn finish(self) -> CodeTable {
        self.table
    }
}

/// Build an assigned-id table from a sequence of sentinel-normalized values.
pub fn build_code_table<'a, I>(dimension: Dimension, values: I) -> CodeTable
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut builder = CodeTableBuilder::new(dimension);
    builder.extend(values);
    builder.finish()
}

/// Parse a fixed-code cell as a non-negative integer.
pub fn parse_code(dimension: Dimension, raw: &str) -> Result<i64> {
    match raw.trim().parse::<i64>() {
        Ok(code) if code >= 0 => Ok(code),
        _ => Err(NormalizeError::InvalidCode {
            dimension,
            value: raw.to_string(),
        }),
    }
}

/// Builder for a dimension that uses the external numeric code as its id.
pub struct FixedCodeTableBuilder<'n> {
    table: CodeTable,
    names: &'n dyn NameSource,
}

impl<'n> FixedCodeTableBuilder<'n> {
    pub fn new(dimension: Dimension, names: &'n dyn NameSource) -> Self {
        Self {
            table: CodeTable::new(dimension),
            names,
        }
    }

    /// Record `code` with the given display name.
    ///
    /// Fails when the code is negative, or when it was already recorded under
    /// a different name.
    pub fn observe(&mut self, code: i64, name: impl Into<String>) -> Result<CodeId> {
        let dimension = self.table.dimension();
        if code < 0 {
            return Err(NormalizeError::InvalidCode {
                dimension,
                value: code.to_string(),
            });
        }
        let id = CodeId::new(code);
        let name = name.into();
        if let Some(existing) = self.table.get(id) {
            let existing = existing.name.clone().unwrap_or_default();
            if existing != name {
                return Err(NormalizeError::DomainInconsistency {
                    dimension,
                    code,
                    existing,
                    conflicting: name,
                });
            }
            return Ok(id);
        }
        let entry = CodeEntry {
            id,
            value: code.to_string(),
            name: Some(name.clone()),
        };
        self.table
            .insert(entry)
            .map_err(|conflict| NormalizeError::DomainInconsistency {
                dimension,
                code,
                existing: conflict.existing,
                conflicting: name,
            })?;
        Ok(id)
    }

    /// Parse a raw cell and record it under the name source's name.
    pub fn observe_raw(&mut self, raw: &str) -> Result<CodeId> {
        let dimension = self.table.dimension();
        let code = parse_code(dimension, raw)?;
        let name = self.names.name_for(dimension, code);
        self.observe(code, name)
    }

    pub fn finish(self) -> CodeTable {
        self.table
    }
}

/// Sentinel-normalized value of a single-column dimension.
pub fn categorical_value<'r>(
    policy: &SentinelPolicy<'_>,
    row: &'r RawRow,
    dimension: Dimension,
) -> Option<&'r str> {
    let column = column_for(dimension)?;
    row.categorical(dimension)
        .and_then(|raw| policy.apply(column, raw))
}

/// Resolve a present value to its surrogate id.
///
/// Absent values resolve to `None`. A present value missing from its table is
/// an [`NormalizeError::UnresolvedReference`].
pub fn resolve_reference(
    tables: &CodeTableSet,
    dimension: Dimension,
    value: Option<&str>,
    encounter: EncounterKey,
) -> Result<Option<CodeId>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let table = tables.table(dimension);
    let id = match dimension.id_policy() {
        IdPolicy::Assigned => table.id_of(value),
        IdPolicy::Fixed => value
            .trim()
            .parse::<i64>()
            .ok()
            .map(CodeId::new)
            .filter(|id| table.contains_id(*id)),
    };
    id.map(Some)
        .ok_or_else(|| NormalizeError::UnresolvedReference {
            encounter,
            dimension,
            value: value.to_string(),
        })
}

/// Build every code table over the full input.
pub fn build_code_tables(
    rows: &[RawRow],
    config: &NormalizationConfig,
    names: &dyn NameSource,
) -> Result<CodeTableSet> {
    let policy = SentinelPolicy::new(config);
    let mut tables = CodeTableSet::new();

    for (_, dimension) in CATEGORICAL_COLUMNS {
        let values = rows
            .iter()
            .map(|row| categorical_value(&policy, row, dimension));
        let table = match dimension.id_policy() {
            IdPolicy::Assigned => build_code_table(dimension, values),
            IdPolicy::Fixed => {
                let mut builder = FixedCodeTableBuilder::new(dimension, names);
                for value in values.flatten() {
                    builder.observe_raw(value)?;
                }
                builder.finish()
            }
        };
        debug!(table = %dimension, entries = table.len(), "built code table");
        tables.set(table);
    }

    let mut medications = CodeTableBuilder::new(Dimension::Medication);
    let mut statuses = CodeTableBuilder::new(Dimension::MedicationStatus);
    for cell in rows.iter().flat_map(|row| row.medications.iter()) {
        if let Some(status) = policy.medication_status(cell) {
            medications.observe(&cell.medication);
            statuses.observe(status);
        }
    }
    for table in [medications.finish(), statuses.finish()] {
        debug!(table = %table.dimension(), entries = table.len(), "built code table");
        tables.set(table);
    }

    Ok(tables)
}
