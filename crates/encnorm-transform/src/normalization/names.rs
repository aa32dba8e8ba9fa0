//! Display names for fixed-code dimensions.

use encnorm_model::options::CODE_PLACEHOLDER;
use encnorm_model::{Dimension, IdMapping, NameTemplates};

/// Produces the display name of a fixed numeric code.
pub trait NameSource {
    fn name_for(&self, dimension: Dimension, code: i64) -> String;
}

/// Names derived by substituting the code into a configured template.
#[derive(Debug, Clone, Default)]
pub struct TemplateNames {
    templates: NameTemplates,
}

impl TemplateNames {
    pub fn new(templates: NameTemplates) -> Self {
        Self { templates }
    }
}

impl NameSource for TemplateNames {
    fn name_for(&self, dimension: Dimension, code: i64) -> String {
        match self.templates.template_for(dimension) {
            Some(template) => template.replace(CODE_PLACEHOLDER, &code.to_string()),
            None => format!("{dimension} {code}"),
        }
    }
}

/// Names taken from the ID-mapping file, falling back to templates for
/// codes the file does not describe.
#[derive(Debug, Clone)]
pub struct MappedNames {
    mapping: IdMapping,
    fallback: TemplateNames,
}

impl MappedNames {
    pub fn new(mapping: IdMapping, fallback: TemplateNames) -> Self {
        Self { mapping, fallback }
    }
}

impl NameSource for MappedNames {
    fn name_for(&self, dimension: Dimension, code: i64) -> String {
        self.mapping
            .description(dimension, code)
            .map_or_else(|| self.fallback.name_for(dimension, code), str::to_string)
    }
}
