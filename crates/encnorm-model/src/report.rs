use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, NormalizeError};
use crate::ids::EncounterKey;

/// A row-scoped failure collected during encounter and relation resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowIssue {
    pub encounter: EncounterKey,
    pub kind: ErrorKind,
    pub message: String,
}

impl RowIssue {
    pub fn new(encounter: EncounterKey, error: &NormalizeError) -> Self {
        Self {
            encounter,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Rows written to one output table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCount {
    pub table: String,
    /// Rows newly written.
    pub written: usize,
    /// Rows the sink already held (idempotent inserts only).
    pub skipped: usize,
}

/// Outcome of one normalization run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub rows_read: usize,
    pub tables: Vec<TableCount>,
    pub issues: Vec<RowIssue>,
}

impl RunReport {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn table(&self, name: &str) -> Option<&TableCount> {
        self.tables.iter().find(|count| count.table == name)
    }

    /// Count of issues per error kind.
    pub fn issue_counts(&self) -> BTreeMap<ErrorKind, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.kind).or_insert(0) += 1;
        }
        counts
    }

    pub(crate) fn count_mut(&mut self, table: &str) -> &mut TableCount {
        let idx = match self.tables.iter().position(|count| count.table == table) {
            Some(idx) => idx,
            None => {
                self.tables.push(TableCount {
                    table: table.to_string(),
                    ..TableCount::default()
                });
                self.tables.len() - 1
            }
        };
        &mut self.tables[idx]
    }

    /// Record one write against `table`.
    pub fn record_write(&mut self, table: &str, inserted: bool) {
        let count = self.count_mut(table);
        if inserted {
            count.written += 1;
        } else {
            count.skipped += 1;
        }
    }
}
