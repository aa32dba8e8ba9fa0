//! Sentinel ("not recorded") handling.

use encnorm_model::{MedicationCell, NormalizationConfig};

/// Map a sentinel token to an absent value.
///
/// Total over all inputs: any value other than the sentinel is returned
/// unchanged, including the empty string.
///
/// ```
/// use encnorm_transform::normalization::normalize_sentinel;
///
/// assert_eq!(normalize_sentinel("?", "?"), None);
/// assert_eq!(normalize_sentinel("Caucasian", "?"), Some("Caucasian"));
/// ```
pub fn normalize_sentinel<'a>(raw: &'a str, sentinel: &str) -> Option<&'a str> {
    if raw == sentinel { None } else { Some(raw) }
}

/// Per-column sentinel resolution backed by the run configuration.
#[derive(Debug, Clone, Copy)]
pub struct SentinelPolicy<'a> {
    config: &'a NormalizationConfig,
}

impl<'a> SentinelPolicy<'a> {
    pub fn new(config: &'a NormalizationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &'a NormalizationConfig {
        self.config
    }

    /// Value of a raw cell, or `None` when it is empty or the column's sentinel.
    pub fn apply<'r>(&self, column: &str, raw: &'r str) -> Option<&'r str> {
        if raw.is_empty() {
            return None;
        }
        normalize_sentinel(raw, self.config.sentinel_for(column))
    }

    /// Owned variant of [`apply`](Self::apply) for free-text attributes.
    pub fn text(&self, column: &str, raw: &str) -> Option<String> {
        self.apply(column, raw).map(str::to_string)
    }

    /// Status token of a prescribed medication, `None` when not prescribed.
    pub fn medication_status<'r>(&self, cell: &'r MedicationCell) -> Option<&'r str> {
        self.apply(&cell.medication, &cell.status)
            .filter(|status| *status != self.config.not_prescribed)
    }
}
