use crate::errors::Result;
use serde::Deserialize;
use shapefold_model::StringTypeMapping;
use std::path::Path;

/// The settings of the class combining pass.
///
/// Settings can be read from a TOML file:
///
/// ```toml
/// conflate-numbers = false
/// string-type-mapping = ["date-time", "uuid"]
/// ```
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CombineConfig {
    /// The string formats kept distinct by the target.
    pub string_type_mapping: StringTypeMapping,
    /// Whether properties of the new classes get sorted by name.
    pub alphabetize_properties: bool,
    /// Whether integers and doubles merge into doubles.
    pub conflate_numbers: bool,
    /// Whether fixed classes may be merged too.
    pub include_fixed_classes: bool,
    /// Whether only classes with the same number of properties may be merged.
    pub only_with_same_properties: bool,
}

impl Default for CombineConfig {
    fn default() -> Self {
        CombineConfig {
            string_type_mapping: StringTypeMapping::default(),
            alphabetize_properties: false,
            conflate_numbers: true,
            include_fixed_classes: false,
            only_with_same_properties: false,
        }
    }
}

impl CombineConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config = toml::from_str::<CombineConfig>(text)?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        log::debug!("loading configuration from {}", path.display());
        Self::from_toml(&text)
    }

    pub fn with_string_type_mapping(mut self, mapping: StringTypeMapping) -> Self {
        self.string_type_mapping = mapping;
        self
    }

    pub fn with_alphabetize_properties(mut self, alphabetize: bool) -> Self {
        self.alphabetize_properties = alphabetize;
        self
    }

    pub fn with_conflate_numbers(mut self, conflate: bool) -> Self {
        self.conflate_numbers = conflate;
        self
    }

    pub fn with_include_fixed_classes(mut self, include: bool) -> Self {
        self.include_fixed_classes = include;
        self
    }

    pub fn with_only_with_same_properties(mut self, only: bool) -> Self {
        self.only_with_same_properties = only;
        self
    }
}
