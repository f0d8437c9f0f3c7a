//! Filter stages.
//!
//! Every stage only ever rejects error rows. Priority, feature type and
//! feature rows are visible when any of their children are, see
//! [`crate::Visibility`].

use quality_index::NodeData;
use quality_model::{
    ErrorRecord, ErrorType, Extent, Geometry, LayerMapping, USER_PROCESSED_LABEL,
    distinct_attribute_names, distinct_feature_types,
};

use crate::options::{FilterOptions, OptionsDelta};

/// Label of the option for errors without an attribute name.
pub const NO_ATTRIBUTE_LABEL: &str = "No attribute";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    ErrorType,
    FeatureType,
    AttributeName,
    UserProcessed,
    Extent,
}

impl StageKind {
    /// Menu title of the stage.
    pub fn title(&self) -> &'static str {
        match self {
            Self::ErrorType => "Error type",
            Self::FeatureType => "Feature type",
            Self::AttributeName => "Attribute",
            Self::UserProcessed => "User processed",
            Self::Extent => "Map extent",
        }
    }
}

/// Filters errors by their check type. The universe is the fixed set of
/// error types and never follows the data.
#[derive(Debug, Clone)]
pub struct ErrorTypeFilter {
    pub options: FilterOptions<ErrorType>,
}

impl ErrorTypeFilter {
    pub fn new(sorted: bool) -> Self {
        let mut options = FilterOptions::new();
        options.set_sorted(sorted);
        for error_type in ErrorType::ALL {
            options.add(error_type, error_type.label());
        }
        Self { options }
    }

    fn accepts(&self, record: &ErrorRecord) -> bool {
        !self.options.rejects(&record.error_type)
    }
}

/// Filters errors by feature type; options follow the data.
#[derive(Debug, Clone)]
pub struct FeatureTypeFilter {
    pub options: FilterOptions<String>,
    mapping: LayerMapping,
}

impl FeatureTypeFilter {
    pub fn new(mapping: LayerMapping, sorted: bool) -> Self {
        let mut options = FilterOptions::new();
        options.set_sorted(sorted);
        Self { options, mapping }
    }

    fn accepts(&self, record: &ErrorRecord) -> bool {
        !self.options.rejects(&record.feature_type)
    }

    fn refresh_options_from_data(&mut self, records: &[ErrorRecord]) -> OptionsDelta {
        let known = distinct_feature_types(records)
            .into_iter()
            .map(|feature_type| {
                (
                    feature_type.to_string(),
                    self.mapping.layer_alias(feature_type).to_string(),
                )
            })
            .collect();
        self.options.sync(known)
    }
}

/// Filters errors by attribute name; options follow the data. Errors without
/// an attribute name share one option of their own.
#[derive(Debug, Clone)]
pub struct AttributeNameFilter {
    pub options: FilterOptions<Option<String>>,
    mapping: LayerMapping,
}

impl AttributeNameFilter {
    pub fn new(mapping: LayerMapping, sorted: bool) -> Self {
        let mut options = FilterOptions::new();
        options.set_sorted(sorted);
        Self { options, mapping }
    }

    fn accepts(&self, record: &ErrorRecord) -> bool {
        !self.options.rejects(&record.attribute_name)
    }

    fn refresh_options_from_data(&mut self, records: &[ErrorRecord]) -> OptionsDelta {
        let known = distinct_attribute_names(records)
            .into_iter()
            .map(|name| match name {
                Some(name) => (
                    Some(name.to_string()),
                    self.mapping.any_field_alias(name).to_string(),
                ),
                None => (None, NO_ATTRIBUTE_LABEL.to_string()),
            })
            .collect();
        self.options.sync(known)
    }
}

/// Single switch hiding errors the user has marked processed.
#[derive(Debug, Clone)]
pub struct UserProcessedFilter {
    pub options: FilterOptions<bool>,
}

impl Default for UserProcessedFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl UserProcessedFilter {
    pub fn new() -> Self {
        let mut options = FilterOptions::new();
        options.add(true, USER_PROCESSED_LABEL);
        Self { options }
    }

    pub fn show_processed(&self) -> bool {
        self.options.is_accepted(&true)
    }

    pub fn set_show_processed(&mut self, show: bool) {
        self.options.set_value_accepted(&true, show);
    }

    fn accepts(&self, record: &ErrorRecord) -> bool {
        !record.is_user_processed || self.show_processed()
    }
}

/// Keeps only errors whose geometry intersects the map extent. Without an
/// extent every error passes.
#[derive(Debug, Clone, Default)]
pub struct ExtentFilter {
    pub extent: Option<Extent>,
}

impl ExtentFilter {
    fn accepts(&self, record: &ErrorRecord) -> bool {
        let Some(extent) = &self.extent else {
            return true;
        };
        record
            .geometry
            .as_ref()
            .and_then(Geometry::bounding_box)
            .is_some_and(|bbox| bbox.intersects(extent))
    }
}

/// One stage of the [`crate::FilterPipeline`].
#[derive(Debug, Clone)]
pub enum FilterStage {
    ErrorType(ErrorTypeFilter),
    FeatureType(FeatureTypeFilter),
    AttributeName(AttributeNameFilter),
    UserProcessed(UserProcessedFilter),
    Extent(ExtentFilter),
}

impl FilterStage {
    pub fn kind(&self) -> StageKind {
        match self {
            FilterStage::ErrorType(_) => StageKind::ErrorType,
            FilterStage::FeatureType(_) => StageKind::FeatureType,
            FilterStage::AttributeName(_) => StageKind::AttributeName,
            FilterStage::UserProcessed(_) => StageKind::UserProcessed,
            FilterStage::Extent(_) => StageKind::Extent,
        }
    }

    /// False only for error rows this stage filters out.
    pub fn accepts(&self, node: &NodeData) -> bool {
        let NodeData::Error(record) = node else {
            return true;
        };
        match self {
            FilterStage::ErrorType(filter) => filter.accepts(record),
            FilterStage::FeatureType(filter) => filter.accepts(record),
            FilterStage::AttributeName(filter) => filter.accepts(record),
            FilterStage::UserProcessed(filter) => filter.accepts(record),
            FilterStage::Extent(filter) => filter.accepts(record),
        }
    }

    /// Recomputes the option universe from the full record set. Stages with
    /// a fixed universe report an empty delta.
    pub fn refresh_options_from_data(&mut self, records: &[ErrorRecord]) -> OptionsDelta {
        match self {
            FilterStage::FeatureType(filter) => filter.refresh_options_from_data(records),
            FilterStage::AttributeName(filter) => filter.refresh_options_from_data(records),
            FilterStage::ErrorType(_) | FilterStage::UserProcessed(_) | FilterStage::Extent(_) => {
                OptionsDelta::default()
            }
        }
    }

    /// True when the stage currently hides anything.
    pub fn is_active(&self) -> bool {
        match self {
            FilterStage::ErrorType(filter) => !filter.options.all_accepted(),
            FilterStage::FeatureType(filter) => !filter.options.all_accepted(),
            FilterStage::AttributeName(filter) => !filter.options.all_accepted(),
            FilterStage::UserProcessed(filter) => !filter.show_processed(),
            FilterStage::Extent(filter) => filter.extent.is_some(),
        }
    }
}
