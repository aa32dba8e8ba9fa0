use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codes::{CodeConflict, Dimension};
use crate::ids::CodeId;

/// Descriptions of the fixed numeric codes, per dimension.
///
/// Loaded from the ID-mapping file that accompanies the raw encounter file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdMapping {
    descriptions: BTreeMap<Dimension, BTreeMap<i64, String>>,
}

impl IdMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a description. Returns whether it was new.
    ///
    /// Repeating a code with the same description is accepted; a different
    /// description is a conflict and leaves the mapping unchanged.
    pub fn insert(
        &mut self,
        dimension: Dimension,
        code: i64,
        description: impl Into<String>,
    ) -> Result<bool, CodeConflict> {
        let description = description.into();
        let codes = self.descriptions.entry(dimension).or_default();
        match codes.get(&code) {
            Some(existing) if *existing == description => Ok(false),
            Some(existing) => Err(CodeConflict {
                id: CodeId::new(code),
                existing: existing.clone(),
                incoming: description,
            }),
            None => {
                codes.insert(code, description);
                Ok(true)
            }
        }
    }

    pub fn description(&self, dimension: Dimension, code: i64) -> Option<&str> {
        self.descriptions
            .get(&dimension)
            .and_then(|codes| codes.get(&code))
            .map(String::as_str)
    }

    pub fn codes(&self, dimension: Dimension) -> usize {
        self.descriptions.get(&dimension).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.values().all(BTreeMap::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_code_must_agree() {
        let mut mapping = IdMapping::new();
        assert_eq!(mapping.insert(Dimension::DischargeDisposition, 11, "Expired"), Ok(true));
        assert_eq!(mapping.insert(Dimension::DischargeDisposition, 11, "Expired"), Ok(false));
        let conflict = mapping
            .insert(Dimension::DischargeDisposition, 11, "Discharged home")
            .unwrap_err();
        assert_eq!(conflict.existing, "Expired");
        assert_eq!(conflict.incoming, "Discharged home");
        assert_eq!(
            mapping.description(Dimension::DischargeDisposition, 11),
            Some("Expired")
        );
        assert_eq!(mapping.insert(Dimension::AdmissionType, 11, "Other"), Ok(true));
    }
}
