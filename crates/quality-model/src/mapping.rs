//! Display-name resolution for feature types and attribute fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Display aliases for one feature type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerAlias {
    /// Name shown instead of the feature type.
    pub name: Option<String>,
    /// Field name -> display name.
    pub fields: BTreeMap<String, String>,
}

/// Maps raw feature types and attribute names to display names.
///
/// Passed explicitly to whatever builds labels; unmapped names are shown
/// as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMapping {
    layers: BTreeMap<String, LayerAlias>,
}

impl LayerMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display name of a feature type.
    #[must_use]
    pub fn with_layer_alias(mut self, feature_type: &str, alias: &str) -> Self {
        self.layers.entry(feature_type.to_string()).or_default().name = Some(alias.to_string());
        self
    }

    /// Set the display name of a field of a feature type.
    #[must_use]
    pub fn with_field_alias(mut self, feature_type: &str, field: &str, alias: &str) -> Self {
        self.layers
            .entry(feature_type.to_string())
            .or_default()
            .fields
            .insert(field.to_string(), alias.to_string());
        self
    }

    pub fn layer_alias<'a>(&'a self, feature_type: &'a str) -> &'a str {
        self.layers
            .get(feature_type)
            .and_then(|layer| layer.name.as_deref())
            .unwrap_or(feature_type)
    }

    pub fn field_alias<'a>(&'a self, feature_type: &str, field: &'a str) -> &'a str {
        self.layers
            .get(feature_type)
            .and_then(|layer| layer.fields.get(field))
            .map(String::as_str)
            .unwrap_or(field)
    }

    /// Field alias looked up across all feature types, for labels that are
    /// not tied to a single feature type. First match wins.
    pub fn any_field_alias<'a>(&'a self, field: &'a str) -> &'a str {
        self.layers
            .values()
            .find_map(|layer| layer.fields.get(field))
            .map(String::as_str)
            .unwrap_or(field)
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
