//! Composable filters over the error index.

pub mod options;
pub mod pipeline;
pub mod stage;
pub mod visibility;

pub use options::{FilterOption, FilterOptions, OptionsDelta};
pub use pipeline::FilterPipeline;
pub use stage::{
    AttributeNameFilter, ErrorTypeFilter, ExtentFilter, FeatureTypeFilter, FilterStage,
    NO_ATTRIBUTE_LABEL, StageKind, UserProcessedFilter,
};
pub use visibility::Visibility;
