//! Wiring of index, filters and map annotations.
//!
//! Each batch runs in a fixed order: the index is diffed against the new
//! records, the filter options follow the data, and the map is brought in
//! line with the rows that are visible afterwards.

use std::collections::HashSet;
use std::time::Instant;

use quality_annotate::{DrawingSurface, ErrorFeature, ErrorVisualizer};
use quality_filter::{FilterPipeline, Visibility};
use quality_index::{ErrorIndex, IndexEvent, NodeId};
use quality_model::{ErrorRecord, ErrorType, Extent};
use tracing::{debug, info, info_span, warn};

use crate::error::Result;
use crate::settings::ManagerSettings;
use crate::status::{CheckStatus, ResultSource};

/// Shown while no poll has finished yet.
pub const UNKNOWN_STATUS_LABEL: &str = "Status of fetching quality results unknown";

/// Processed flag change to persist upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedChange {
    pub identifier: String,
    pub processed: bool,
}

/// What one manager call changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManagerUpdate {
    pub index_events: Vec<IndexEvent>,
    /// Errors that became visible and were drawn on the map.
    pub shown: Vec<String>,
    /// Errors that stopped being visible and were removed from the map.
    pub hidden: Vec<String>,
    pub checked: Option<CheckedChange>,
}

impl ManagerUpdate {
    pub fn is_empty(&self) -> bool {
        self.index_events.is_empty()
            && self.shown.is_empty()
            && self.hidden.is_empty()
            && self.checked.is_none()
    }
}

/// Owns the error index, the filter pipeline and the map visualizer and
/// keeps them consistent.
#[derive(Debug)]
pub struct QualityResultManager<S: DrawingSurface> {
    settings: ManagerSettings,
    index: ErrorIndex,
    pipeline: FilterPipeline,
    visualizer: ErrorVisualizer<S>,
    status: Option<CheckStatus>,
    map_extent: Option<Extent>,
}

impl<S: DrawingSurface> QualityResultManager<S> {
    pub fn new(settings: ManagerSettings, surface: S) -> Self {
        let pipeline =
            FilterPipeline::with_default_stages(&settings.layer_mapping, settings.sort_filter_options);
        let mut visualizer = ErrorVisualizer::new(surface);
        visualizer.set_visible(settings.show_errors_on_map);
        Self {
            settings,
            index: ErrorIndex::new(),
            pipeline,
            visualizer,
            status: None,
            map_extent: None,
        }
    }

    pub fn settings(&self) -> &ManagerSettings {
        &self.settings
    }

    pub fn index(&self) -> &ErrorIndex {
        &self.index
    }

    pub fn pipeline(&self) -> &FilterPipeline {
        &self.pipeline
    }

    pub fn visualizer(&self) -> &ErrorVisualizer<S> {
        &self.visualizer
    }

    pub fn status(&self) -> Option<CheckStatus> {
        self.status
    }

    pub fn status_label(&self) -> &'static str {
        self.status.map_or(UNKNOWN_STATUS_LABEL, |status| status.label())
    }

    /// Applies a complete result batch.
    pub fn refresh(&mut self, records: &[ErrorRecord]) -> ManagerUpdate {
        let span = info_span!("refresh", records = records.len());
        let _guard = span.enter();
        let start = Instant::now();

        let index_events = self.index.refresh(records);
        self.pipeline.refresh_options_from_data(records);
        let (shown, hidden) = self.sync_map();

        info!(
            events = index_events.len(),
            shown = shown.len(),
            hidden = hidden.len(),
            total = self.index.error_count(),
            duration_ms = start.elapsed().as_millis(),
            "quality results applied"
        );
        ManagerUpdate {
            index_events,
            shown,
            hidden,
            checked: None,
        }
    }

    /// Runs one fetch cycle against `source`. A failed fetch leaves the
    /// current results in place.
    pub fn poll<R: ResultSource + ?Sized>(&mut self, source: &mut R) -> Result<ManagerUpdate> {
        self.status = Some(CheckStatus::Checking);
        match source.fetch_results() {
            Ok(None) => {
                self.status = Some(CheckStatus::ResultOngoing);
                debug!("quality check still running");
                Ok(ManagerUpdate::default())
            }
            Ok(Some(records)) => {
                self.status = Some(CheckStatus::ResultUpdated);
                Ok(self.refresh(&records))
            }
            Err(error) => {
                self.status = Some(CheckStatus::ResultFailed);
                warn!(
                    %error,
                    recoverable = error.is_recoverable(),
                    "failed to check quality results"
                );
                Err(error)
            }
        }
    }

    /// Marks an error processed or unprocessed. The identifier must be in
    /// the index; release builds ignore unknown ones.
    pub fn set_user_processed(&mut self, identifier: &str, processed: bool) -> ManagerUpdate {
        let span = info_span!("set_user_processed", identifier, processed);
        let _guard = span.enter();

        let Some(index_events) = self.index.set_user_processed(identifier, processed) else {
            return ManagerUpdate::default();
        };
        let (shown, hidden) = self.sync_map();
        ManagerUpdate {
            index_events,
            shown,
            hidden,
            checked: Some(CheckedChange {
                identifier: identifier.to_string(),
                processed,
            }),
        }
    }

    /// Highlights a visible error on the map, or clears the highlight for
    /// `None`. Returns false when nothing is selected afterwards.
    pub fn select(&mut self, identifier: Option<&str>) -> bool {
        let Some(identifier) = identifier else {
            self.visualizer.refresh_selection(None);
            return false;
        };
        let Some(id) = self.index.find_error(identifier) else {
            warn!(identifier, "selected error not found");
            return self.visualizer.selected().is_some();
        };
        if !self.pipeline.visibility(&self.index).is_visible(id) {
            debug!(identifier, "selected error is filtered out");
            return self.visualizer.selected().is_some();
        }
        let Some(record) = self.index.record(id) else {
            return self.visualizer.selected().is_some();
        };
        self.visualizer
            .refresh_selection(Some(ErrorFeature::from(record)));
        true
    }

    pub fn selected(&self) -> Option<&str> {
        self.visualizer.selected()
    }

    /// Changes the filters through `update` and syncs the map.
    pub fn update_filters(&mut self, update: impl FnOnce(&mut FilterPipeline)) -> ManagerUpdate {
        update(&mut self.pipeline);
        let (shown, hidden) = self.sync_map();
        ManagerUpdate {
            shown,
            hidden,
            ..ManagerUpdate::default()
        }
    }

    pub fn set_accepted_error_types(
        &mut self,
        values: impl IntoIterator<Item = ErrorType>,
    ) -> ManagerUpdate {
        self.update_filters(|pipeline| pipeline.set_accepted_error_types(values))
    }

    pub fn set_accepted_feature_types(
        &mut self,
        values: impl IntoIterator<Item = String>,
    ) -> ManagerUpdate {
        self.update_filters(|pipeline| pipeline.set_accepted_feature_types(values))
    }

    pub fn set_accepted_attribute_names(
        &mut self,
        values: impl IntoIterator<Item = Option<String>>,
    ) -> ManagerUpdate {
        self.update_filters(|pipeline| pipeline.set_accepted_attribute_names(values))
    }

    pub fn set_show_user_processed(&mut self, show: bool) -> ManagerUpdate {
        self.update_filters(|pipeline| pipeline.set_show_user_processed(show))
    }

    /// Records the current map extent. It only filters while filtering by
    /// extent is enabled.
    pub fn set_map_extent(&mut self, extent: Option<Extent>) -> ManagerUpdate {
        self.map_extent = extent;
        if !self.settings.filter_by_extent {
            return ManagerUpdate::default();
        }
        self.update_filters(|pipeline| pipeline.set_extent(extent))
    }

    pub fn set_filter_by_extent(&mut self, enabled: bool) -> ManagerUpdate {
        self.settings.filter_by_extent = enabled;
        let extent = if enabled { self.map_extent } else { None };
        self.update_filters(|pipeline| pipeline.set_extent(extent))
    }

    /// Shows or hides every error annotation without touching the filters.
    pub fn set_show_errors_on_map(&mut self, show: bool) {
        self.settings.show_errors_on_map = show;
        self.visualizer.set_visible(show);
    }

    /// True when any filter currently hides something.
    pub fn filters_active(&self) -> bool {
        self.pipeline.is_active()
    }

    pub fn visibility(&mut self) -> &Visibility {
        self.pipeline.visibility(&self.index)
    }

    /// Visible children of `parent` in row order.
    pub fn visible_children(&mut self, parent: NodeId) -> Vec<NodeId> {
        self.pipeline
            .visibility(&self.index)
            .visible_children(&self.index, parent)
    }

    /// `(visible, total)` error counts.
    pub fn error_counts(&mut self) -> (usize, usize) {
        let root = self.index.root();
        let visible = self
            .pipeline
            .visibility(&self.index)
            .visible_error_count(root);
        (visible, self.index.error_count())
    }

    /// Header of the error tree, e.g. `Errors (3/5)`.
    pub fn header_label(&mut self) -> String {
        let (visible, total) = self.error_counts();
        format!("Errors ({visible}/{total})")
    }

    /// Draws newly visible errors and removes no longer visible ones, along
    /// with the selection when its error is gone or filtered out. Returns the
    /// identifiers shown and hidden.
    fn sync_map(&mut self) -> (Vec<String>, Vec<String>) {
        let visible: Vec<&ErrorRecord> = self
            .pipeline
            .visibility(&self.index)
            .visible_errors(&self.index)
            .into_iter()
            .filter_map(|id| self.index.record(id))
            .collect();
        let visible_ids: HashSet<&str> = visible
            .iter()
            .map(|record| record.unique_identifier.as_str())
            .collect();

        let hidden: Vec<String> = self
            .visualizer
            .shown()
            .filter(|identifier| !visible_ids.contains(identifier))
            .map(str::to_string)
            .collect();
        let features: Vec<ErrorFeature> = visible
            .iter()
            .filter(|record| !self.visualizer.is_shown(&record.unique_identifier))
            .map(|record| ErrorFeature::from(*record))
            .collect();
        let shown: Vec<String> = features
            .iter()
            .map(|feature| feature.identifier.clone())
            .collect();
        // The highlight only lives as long as its row is visible.
        let selection_lost = self
            .visualizer
            .selected()
            .is_some_and(|selected| !visible_ids.contains(selected));

        self.visualizer
            .remove_errors(hidden.iter().map(String::as_str));
        if selection_lost {
            self.visualizer.clear_selection();
        }
        self.visualizer.add_errors(features);
        if !shown.is_empty() || !hidden.is_empty() {
            debug!(shown = shown.len(), hidden = hidden.len(), "map synced");
        }
        (shown, hidden)
    }
}
