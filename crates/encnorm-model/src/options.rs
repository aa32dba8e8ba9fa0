//! Configuration options for a normalization run.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codes::Dimension;
use crate::error::ConfigError;

/// Placeholder the raw file uses for "not recorded".
pub const DEFAULT_SENTINEL: &str = "?";

/// Placeholder substituted with the numeric code in name templates.
pub const CODE_PLACEHOLDER: &str = "{code}";

/// Literal tokens for a tri-state flag column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagTokens {
    pub true_token: String,
    pub false_token: String,
}

impl FlagTokens {
    pub fn new(true_token: impl Into<String>, false_token: impl Into<String>) -> Self {
        Self {
            true_token: true_token.into(),
            false_token: false_token.into(),
        }
    }
}

/// Display-name templates for the fixed-code dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameTemplates {
    pub admission_type: String,
    pub discharge_disposition: String,
    pub admission_source: String,
}

impl Default for NameTemplates {
    fn default() -> Self {
        Self {
            admission_type: "Admission type {code}".to_string(),
            discharge_disposition: "Discharge disposition {code}".to_string(),
            admission_source: "Admission source {code}".to_string(),
        }
    }
}

impl NameTemplates {
    /// Template for a fixed-code dimension, `None` for assigned dimensions.
    pub fn template_for(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::AdmissionType => Some(&self.admission_type),
            Dimension::DischargeDisposition => Some(&self.discharge_disposition),
            Dimension::AdmissionSource => Some(&self.admission_source),
            _ => None,
        }
    }
}

/// Options controlling sentinel handling, flag decoding and code naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizationConfig {
    /// Sentinel shared by every column without an override.
    pub default_sentinel: String,

    /// Per-column sentinel overrides, keyed by raw column name.
    pub sentinels: BTreeMap<String, String>,

    /// Tokens of the `change` column.
    pub change_flag: FlagTokens,

    /// Tokens of the `diabetesMed` column.
    pub medication_flag: FlagTokens,

    /// Medication status meaning "not prescribed"; such cells emit no relation.
    pub not_prescribed: String,

    pub name_templates: NameTemplates,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            default_sentinel: DEFAULT_SENTINEL.to_string(),
            sentinels: BTreeMap::new(),
            change_flag: FlagTokens::new("Ch", "No"),
            medication_flag: FlagTokens::new("Yes", "No"),
            not_prescribed: "No".to_string(),
            name_templates: NameTemplates::default(),
        }
    }
}

impl NormalizationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sentinel configured for a raw column.
    pub fn sentinel_for(&self, column: &str) -> &str {
        self.sentinels
            .get(column)
            .map_or(self.default_sentinel.as_str(), String::as_str)
    }

    pub fn with_default_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.default_sentinel = sentinel.into();
        self
    }

    pub fn with_sentinel(mut self, column: impl Into<String>, sentinel: impl Into<String>) -> Self {
        self.sentinels.insert(column.into(), sentinel.into());
        self
    }

    pub fn with_name_templates(mut self, templates: NameTemplates) -> Self {
        self.name_templates = templates;
        self
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Load and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Every name template must contain the `{code}` placeholder.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let templates = [
            &self.name_templates.admission_type,
            &self.name_templates.discharge_disposition,
            &self.name_templates.admission_source,
        ];
        for template in templates {
            if !template.contains(CODE_PLACEHOLDER) {
                return Err(ConfigError::InvalidTemplate {
                    template: template.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_raw_file_conventions() {
        let config = NormalizationConfig::default();
        assert_eq!(config.sentinel_for("race"), "?");
        assert_eq!(config.change_flag, FlagTokens::new("Ch", "No"));
        assert_eq!(config.medication_flag, FlagTokens::new("Yes", "No"));
        assert_eq!(config.not_prescribed, "No");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_overrides_merge_with_defaults() {
        let config = NormalizationConfig::from_toml_str(
            r#"
            default_sentinel = "NA"

            [sentinels]
            max_glu_serum = "None"

            [name_templates]
            admission_source = "Source #{code}"
            "#,
        )
        .unwrap();
        assert_eq!(config.sentinel_for("race"), "NA");
        assert_eq!(config.sentinel_for("max_glu_serum"), "None");
        assert_eq!(config.name_templates.admission_source, "Source #{code}");
        assert_eq!(
            config.name_templates.admission_type,
            "Admission type {code}"
        );
        assert_eq!(config.change_flag.true_token, "Ch");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(NormalizationConfig::from_toml_str("sentinal = \"?\"").is_err());
    }

    #[test]
    fn template_without_placeholder_fails_validation() {
        let config = NormalizationConfig::new().with_name_templates(NameTemplates {
            admission_type: "Admission".to_string(),
            ..NameTemplates::default()
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTemplate { .. })
        ));
    }
}
