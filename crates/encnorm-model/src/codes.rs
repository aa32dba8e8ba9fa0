//! Code tables: one lookup table per categorical dimension.
//!
//! Every table keeps a bijection between natural values and surrogate ids.
//! Engine-assigned tables number their entries densely from 1 in first-seen
//! order. Fixed-code tables (admission type, discharge disposition and
//! admission source) use the external numeric code both as the surrogate id
//! and as the natural value, and carry a derived display name.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::CodeId;

/// Categorical dimension backed by a code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Race,
    Gender,
    AgeGroup,
    AdmissionType,
    DischargeDisposition,
    AdmissionSource,
    MedicalSpecialty,
    Readmission,
    A1cResult,
    GlucoseSerum,
    Medication,
    MedicationStatus,
}

/// How surrogate ids of a dimension are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPolicy {
    /// Ids are assigned by the engine in first-seen order.
    Assigned,
    /// Ids are the external numeric codes found in the input.
    Fixed,
}

impl Dimension {
    pub const ALL: [Dimension; 12] = [
        Dimension::Race,
        Dimension::Gender,
        Dimension::AgeGroup,
        Dimension::AdmissionType,
        Dimension::DischargeDisposition,
        Dimension::AdmissionSource,
        Dimension::MedicalSpecialty,
        Dimension::Readmission,
        Dimension::A1cResult,
        Dimension::GlucoseSerum,
        Dimension::Medication,
        Dimension::MedicationStatus,
    ];

    /// Name of the lookup table holding this dimension.
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Race => "race",
            Self::Gender => "gender",
            Self::AgeGroup => "age_group",
            Self::AdmissionType => "admission_type",
            Self::DischargeDisposition => "discharge_disposition",
            Self::AdmissionSource => "admission_source",
            Self::MedicalSpecialty => "medical_specialty",
            Self::Readmission => "readmission",
            Self::A1cResult => "a1c_result",
            Self::GlucoseSerum => "glucose_serum",
            Self::Medication => "medication",
            Self::MedicationStatus => "medication_status",
        }
    }

    pub fn id_policy(self) -> IdPolicy {
        match self {
            Self::AdmissionType | Self::DischargeDisposition | Self::AdmissionSource => {
                IdPolicy::Fixed
            }
            _ => IdPolicy::Assigned,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// A single row of a code table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    pub id: CodeId,
    /// Natural value as observed in the input (the code itself for fixed tables).
    pub value: String,
    /// Display name, only present on fixed-code tables.
    pub name: Option<String>,
}

/// Rejected insert: the id or the value is already bound to something else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeConflict {
    pub id: CodeId,
    pub existing: String,
    pub incoming: String,
}

#[derive(Debug, Clone)]
pub struct CodeTable {
    dimension: Dimension,
    entries: Vec<CodeEntry>,
    by_value: HashMap<String, usize>,
    by_id: BTreeMap<CodeId, usize>,
}

impl CodeTable {
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
            by_value: HashMap::new(),
            by_id: BTreeMap::new(),
        }
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Insert an entry, keeping the value/id bijection.
    ///
    /// Returns `Ok(false)` when the exact (id, value) pair is already present.
    pub fn insert(&mut self, entry: CodeEntry) -> Result<bool, CodeConflict> {
        if let Some(&idx) = self.by_value.get(&entry.value) {
            let existing = &self.entries[idx];
            if existing.id == entry.id {
                return Ok(false);
            }
            return Err(CodeConflict {
                id: existing.id,
                existing: existing.value.clone(),
                incoming: entry.value,
            });
        }
        if let Some(&idx) = self.by_id.get(&entry.id) {
            return Err(CodeConflict {
                id: entry.id,
                existing: self.entries[idx].value.clone(),
                incoming: entry.value,
            });
        }
        let idx = self.entries.len();
        self.by_value.insert(entry.value.clone(), idx);
        self.by_id.insert(entry.id, idx);
        self.entries.push(entry);
        Ok(true)
    }

    /// Id of `value`, assigning the next dense id when it is new.
    pub fn intern(&mut self, value: &str) -> CodeId {
        if let Some(id) = self.id_of(value) {
            return id;
        }
        let id = CodeId::new(
            self.by_id
                .keys()
                .next_back()
                .map_or(1, |last| last.get() + 1),
        );
        let idx = self.entries.len();
        self.by_value.insert(value.to_string(), idx);
        self.by_id.insert(id, idx);
        self.entries.push(CodeEntry {
            id,
            value: value.to_string(),
            name: None,
        });
        id
    }

    pub fn id_of(&self, value: &str) -> Option<CodeId> {
        self.by_value.get(value).map(|&idx| self.entries[idx].id)
    }

    pub fn entry_by_value(&self, value: &str) -> Option<&CodeEntry> {
        self.by_value.get(value).map(|&idx| &self.entries[idx])
    }

    pub fn get(&self, id: CodeId) -> Option<&CodeEntry> {
        self.by_id.get(&id).map(|&idx| &self.entries[idx])
    }

    pub fn contains_id(&self, id: CodeId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[CodeEntry] {
        &self.entries
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The complete set of code tables for one normalization run.
#[derive(Debug, Clone)]
pub struct CodeTableSet {
    tables: Vec<CodeTable>,
}

impl Default for CodeTableSet {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeTableSet {
    pub fn new() -> Self {
        Self {
            tables: Dimension::ALL.iter().map(|&d| CodeTable::new(d)).collect(),
        }
    }

    pub fn table(&self, dimension: Dimension) -> &CodeTable {
        &self.tables[dimension.index()]
    }

    pub fn table_mut(&mut self, dimension: Dimension) -> &mut CodeTable {
        &mut self.tables[dimension.index()]
    }

    /// Replace the table of its dimension.
    pub fn set(&mut self, table: CodeTable) {
        let idx = table.dimension().index();
        self.tables[idx] = table;
    }

    pub fn id_of(&self, dimension: Dimension, value: &str) -> Option<CodeId> {
        self.table(dimension).id_of(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CodeTable> {
        self.tables.iter()
    }

    /// Total number of entries across all tables.
    pub fn entry_count(&self) -> usize {
        self.tables.iter().map(CodeTable::len).sum()
    }
}
