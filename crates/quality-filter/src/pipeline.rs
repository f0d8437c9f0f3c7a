//! Ordered chain of filter stages combined by logical AND.

use quality_index::{ErrorIndex, NodeData};
use quality_model::{ErrorRecord, ErrorType, Extent, LayerMapping};
use tracing::{debug, trace};

use crate::options::{FilterOptions, OptionsDelta};
use crate::stage::{
    AttributeNameFilter, ErrorTypeFilter, ExtentFilter, FeatureTypeFilter, FilterStage, StageKind,
    UserProcessedFilter,
};
use crate::visibility::Visibility;

#[derive(Debug, Clone, Default)]
struct VisibilityCache {
    /// `(index revision, pipeline revision)` the visibility was computed for.
    key: Option<(u64, u64)>,
    visibility: Visibility,
}

/// Filter chain over one [`ErrorIndex`].
///
/// Every change to a stage bumps [`FilterPipeline::revision`]. Visibility is
/// recomputed lazily the next time it is requested after either the pipeline
/// or the index revision moved.
#[derive(Debug, Clone, Default)]
pub struct FilterPipeline {
    stages: Vec<FilterStage>,
    revision: u64,
    cache: VisibilityCache,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error type, feature type, attribute, user processed and extent
    /// stages, in that order.
    pub fn with_default_stages(mapping: &LayerMapping, sorted: bool) -> Self {
        let mut pipeline = Self::new();
        pipeline.add_stage(FilterStage::ErrorType(ErrorTypeFilter::new(sorted)));
        pipeline.add_stage(FilterStage::FeatureType(FeatureTypeFilter::new(
            mapping.clone(),
            sorted,
        )));
        pipeline.add_stage(FilterStage::AttributeName(AttributeNameFilter::new(
            mapping.clone(),
            sorted,
        )));
        pipeline.add_stage(FilterStage::UserProcessed(UserProcessedFilter::new()));
        pipeline.add_stage(FilterStage::Extent(ExtentFilter::default()));
        pipeline
    }

    pub fn add_stage(&mut self, stage: FilterStage) {
        self.stages.push(stage);
        self.bump();
    }

    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    /// First stage of the given kind.
    pub fn stage(&self, kind: StageKind) -> Option<&FilterStage> {
        self.stages.iter().find(|stage| stage.kind() == kind)
    }

    /// Mutable access to a stage. Counts as a filter change.
    pub fn stage_mut(&mut self, kind: StageKind) -> Option<&mut FilterStage> {
        let position = self.stages.iter().position(|stage| stage.kind() == kind)?;
        self.bump();
        self.stages.get_mut(position)
    }

    pub fn error_types(&self) -> Option<&FilterOptions<ErrorType>> {
        match self.stage(StageKind::ErrorType)? {
            FilterStage::ErrorType(filter) => Some(&filter.options),
            _ => None,
        }
    }

    pub fn error_types_mut(&mut self) -> Option<&mut FilterOptions<ErrorType>> {
        match self.stage_mut(StageKind::ErrorType)? {
            FilterStage::ErrorType(filter) => Some(&mut filter.options),
            _ => None,
        }
    }

    pub fn feature_types(&self) -> Option<&FilterOptions<String>> {
        match self.stage(StageKind::FeatureType)? {
            FilterStage::FeatureType(filter) => Some(&filter.options),
            _ => None,
        }
    }

    pub fn feature_types_mut(&mut self) -> Option<&mut FilterOptions<String>> {
        match self.stage_mut(StageKind::FeatureType)? {
            FilterStage::FeatureType(filter) => Some(&mut filter.options),
            _ => None,
        }
    }

    pub fn attribute_names(&self) -> Option<&FilterOptions<Option<String>>> {
        match self.stage(StageKind::AttributeName)? {
            FilterStage::AttributeName(filter) => Some(&filter.options),
            _ => None,
        }
    }

    pub fn attribute_names_mut(&mut self) -> Option<&mut FilterOptions<Option<String>>> {
        match self.stage_mut(StageKind::AttributeName)? {
            FilterStage::AttributeName(filter) => Some(&mut filter.options),
            _ => None,
        }
    }

    pub fn user_processed(&self) -> Option<&UserProcessedFilter> {
        match self.stage(StageKind::UserProcessed)? {
            FilterStage::UserProcessed(filter) => Some(filter),
            _ => None,
        }
    }

    pub fn extent(&self) -> Option<&Extent> {
        match self.stage(StageKind::Extent)? {
            FilterStage::Extent(filter) => filter.extent.as_ref(),
            _ => None,
        }
    }

    pub fn set_accepted_error_types(&mut self, values: impl IntoIterator<Item = ErrorType>) {
        if let Some(options) = self.error_types_mut() {
            options.set_accepted(values);
        }
    }

    pub fn set_accepted_feature_types(&mut self, values: impl IntoIterator<Item = String>) {
        if let Some(options) = self.feature_types_mut() {
            options.set_accepted(values);
        }
    }

    pub fn set_accepted_attribute_names(
        &mut self,
        values: impl IntoIterator<Item = Option<String>>,
    ) {
        if let Some(options) = self.attribute_names_mut() {
            options.set_accepted(values);
        }
    }

    pub fn set_show_user_processed(&mut self, show: bool) {
        if let Some(FilterStage::UserProcessed(filter)) =
            self.stage_mut(StageKind::UserProcessed)
        {
            filter.set_show_processed(show);
        }
    }

    pub fn set_extent(&mut self, extent: Option<Extent>) {
        if let Some(FilterStage::Extent(filter)) = self.stage_mut(StageKind::Extent) {
            filter.extent = extent;
        }
    }

    /// True when every stage accepts the node.
    pub fn accepts(&self, node: &NodeData) -> bool {
        self.stages.iter().all(|stage| stage.accepts(node))
    }

    /// Rebuilds the option universes of the dynamic stages from `records`.
    /// Counts as exactly one filter change, whatever the number of stages.
    pub fn refresh_options_from_data(&mut self, records: &[ErrorRecord]) -> OptionsDelta {
        let mut delta = OptionsDelta::default();
        for stage in &mut self.stages {
            delta += stage.refresh_options_from_data(records);
        }
        self.bump();
        debug!(
            added = delta.added,
            removed = delta.removed,
            revision = self.revision,
            "filter options refreshed"
        );
        delta
    }

    /// Incremented on every filter change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True when any stage currently hides something.
    pub fn is_active(&self) -> bool {
        self.stages.iter().any(FilterStage::is_active)
    }

    /// Forces the next [`FilterPipeline::visibility`] call to recompute.
    pub fn invalidate(&mut self) {
        self.bump();
    }

    /// Visibility of `index` under the current stages.
    pub fn visibility(&mut self, index: &ErrorIndex) -> &Visibility {
        let key = (index.revision(), self.revision);
        if self.cache.key != Some(key) {
            let stages = &self.stages;
            self.cache.visibility = Visibility::compute(index, |node| {
                stages.iter().all(|stage| stage.accepts(node))
            });
            self.cache.key = Some(key);
            trace!(
                index_revision = key.0,
                filter_revision = key.1,
                "visibility recomputed"
            );
        }
        &self.cache.visibility
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}
