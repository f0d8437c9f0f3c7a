use serde::{Deserialize, Serialize};

use crate::enums::{ErrorType, Priority};
use crate::geometry::Geometry;

/// Error description in the languages the quality service supports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub fi: String,
    #[serde(default)]
    pub sv: String,
    #[serde(default)]
    pub en: String,
}

impl LocalizedText {
    /// Text for a language code, falling back to English and then to any
    /// non-empty translation.
    pub fn for_language(&self, language: &str) -> &str {
        let preferred = match language.trim().to_lowercase().as_str() {
            "fi" => &self.fi,
            "sv" => &self.sv,
            _ => &self.en,
        };
        [preferred, &self.en, &self.fi, &self.sv]
            .into_iter()
            .find(|text| !text.is_empty())
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// One quality error reported by the quality service.
///
/// Everything except `is_user_processed` is fixed once the record is created.
/// `unique_identifier` is stable across result refreshes for the same
/// real-world error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub priority: Priority,
    pub feature_type: String,
    pub feature_id: String,
    /// Identifier assigned by the check that produced the error.
    pub error_id: u64,
    pub unique_identifier: String,
    pub error_type: ErrorType,
    /// Only present for attribute errors.
    #[serde(default)]
    pub attribute_name: Option<String>,
    pub description: LocalizedText,
    /// Extra detail shown as a tooltip.
    #[serde(default)]
    pub extra_info: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub is_user_processed: bool,
}

/// Distinct feature types in first-seen order.
pub fn distinct_feature_types(records: &[ErrorRecord]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .map(|record| record.feature_type.as_str())
        .filter(|feature_type| seen.insert(*feature_type))
        .collect()
}

/// Distinct attribute names in first-seen order, `None` included when any
/// record has no attribute name.
pub fn distinct_attribute_names(records: &[ErrorRecord]) -> Vec<Option<&str>> {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .map(|record| record.attribute_name.as_deref())
        .filter(|name| seen.insert(*name))
        .collect()
}
