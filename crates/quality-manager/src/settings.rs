//! Manager settings.

use std::time::Duration;

use quality_model::LayerMapping;
use serde::{Deserialize, Serialize};

use crate::error::{ManagerError, Result};

/// Default interval between result polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Settings of a [`crate::QualityResultManager`].
///
/// Every field has a default, so a settings file only needs the values it
/// changes:
///
/// ```toml
/// poll_interval_secs = 10
/// filter_by_extent = true
///
/// [layer_mapping.building]
/// name = "Buildings"
/// fields = { height = "Height" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerSettings {
    pub poll_interval_secs: u64,
    /// Display names of feature types and their fields.
    pub layer_mapping: LayerMapping,
    /// Keep filter menu options in alphabetical order.
    pub sort_filter_options: bool,
    pub show_errors_on_map: bool,
    /// Apply the map extent passed to
    /// [`crate::QualityResultManager::set_map_extent`].
    pub filter_by_extent: bool,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            layer_mapping: LayerMapping::default(),
            sort_filter_options: true,
            show_errors_on_map: true,
            filter_by_extent: false,
        }
    }
}

impl ManagerSettings {
    /// Parses and validates settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(text).map_err(|source| ManagerError::Settings { source })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(ManagerError::InvalidSetting {
                name: "poll_interval_secs",
                reason: "must be at least one second".to_string(),
            });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    #[must_use]
    pub fn with_layer_mapping(mut self, layer_mapping: LayerMapping) -> Self {
        self.layer_mapping = layer_mapping;
        self
    }
}
