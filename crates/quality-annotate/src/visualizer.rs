//! Error annotations plus the selected-error overlay.

use std::collections::BTreeMap;

use quality_model::{ErrorRecord, Geometry, Priority};
use tracing::debug;

use crate::registry::AnnotationRegistry;
use crate::surface::DrawingSurface;

/// Key prefix of the selected-error overlay.
pub const SELECTED_PREFIX: &str = "selected-";

/// What the visualizer needs to know to draw one error.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorFeature {
    pub identifier: String,
    pub priority: Priority,
    pub geometry: Option<Geometry>,
}

impl From<&ErrorRecord> for ErrorFeature {
    fn from(record: &ErrorRecord) -> Self {
        Self {
            identifier: record.unique_identifier.clone(),
            priority: record.priority,
            geometry: record.geometry.clone(),
        }
    }
}

/// Draws errors on a [`DrawingSurface`] and keeps at most one of them
/// highlighted as selected.
///
/// The selected overlay lives under [`SELECTED_PREFIX`] next to the plain
/// annotation of the same error.
#[derive(Debug)]
pub struct ErrorVisualizer<S: DrawingSurface> {
    surface: S,
    registry: AnnotationRegistry<S::Handle>,
    features: BTreeMap<String, ErrorFeature>,
    selected: Option<ErrorFeature>,
    visible: bool,
}

impl<S: DrawingSurface> ErrorVisualizer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            registry: AnnotationRegistry::new(),
            features: BTreeMap::new(),
            selected: None,
            visible: true,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn registry(&self) -> &AnnotationRegistry<S::Handle> {
        &self.registry
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Identifier of the selected error.
    pub fn selected(&self) -> Option<&str> {
        self.selected
            .as_ref()
            .map(|feature| feature.identifier.as_str())
    }

    /// Errors currently shown, selected overlay excluded.
    pub fn shown(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    pub fn is_shown(&self, identifier: &str) -> bool {
        self.features.contains_key(identifier)
    }

    /// Adds or redraws the given errors.
    pub fn add_errors(&mut self, features: impl IntoIterator<Item = ErrorFeature>) {
        let mut count = 0;
        for feature in features {
            if self.visible {
                self.draw(&feature, false, "");
            }
            self.features.insert(feature.identifier.clone(), feature);
            count += 1;
        }
        if count > 0 {
            debug!(count, "errors added to map");
        }
    }

    /// Removes the given errors. Removing the selected error also removes
    /// its overlay.
    pub fn remove_errors<'a>(&mut self, identifiers: impl IntoIterator<Item = &'a str>) {
        let identifiers: Vec<&str> = identifiers.into_iter().collect();
        for identifier in &identifiers {
            self.features.remove(*identifier);
        }
        let removed = self
            .registry
            .remove(&mut self.surface, identifiers.iter().copied(), "");

        let selected_removed = self
            .selected()
            .is_some_and(|selected| identifiers.iter().any(|id| *id == selected));
        if selected_removed {
            self.clear_selection();
        }
        if removed > 0 {
            debug!(removed, "errors removed from map");
        }
    }

    /// Moves the selected overlay to `selected`, or clears it for `None`.
    /// Calling it again with the same error redraws the same single overlay.
    pub fn refresh_selection(&mut self, selected: Option<ErrorFeature>) {
        self.clear_selection();
        let Some(feature) = selected else {
            return;
        };
        if self.visible {
            self.draw(&feature, true, SELECTED_PREFIX);
        }
        self.selected = Some(feature);
    }

    pub fn clear_selection(&mut self) {
        if let Some(previous) = self.selected.take() {
            self.registry.remove(
                &mut self.surface,
                [previous.identifier.as_str()],
                SELECTED_PREFIX,
            );
        }
    }

    /// Hides all annotations, or draws every known error again.
    pub fn set_visible(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        if !visible {
            self.registry.clear(&mut self.surface);
            debug!("error annotations hidden");
            return;
        }
        let features: Vec<ErrorFeature> = self.features.values().cloned().collect();
        for feature in &features {
            self.draw(feature, false, "");
        }
        if let Some(selected) = self.selected.clone() {
            self.draw(&selected, true, SELECTED_PREFIX);
        }
        debug!(count = features.len(), "error annotations shown");
    }

    fn draw(&mut self, feature: &ErrorFeature, highlighted: bool, prefix: &str) {
        self.registry.add_or_replace(
            &mut self.surface,
            &feature.identifier,
            feature.geometry.as_ref(),
            feature.priority,
            highlighted,
            prefix,
        );
    }
}
