//! Bookkeeping of drawn annotations per error.

use std::collections::HashMap;

use quality_model::{Geometry, Priority};
use tracing::trace;

use crate::surface::{AnnotationPrimitive, DrawingSurface};

/// Maps `prefix + error identifier` to the handles drawn for that error.
///
/// Each composite key owns at most one handle list. The same error can be
/// registered under several prefixes at once.
#[derive(Debug, Clone)]
pub struct AnnotationRegistry<H> {
    handles: HashMap<String, Vec<H>>,
}

impl<H> Default for AnnotationRegistry<H> {
    fn default() -> Self {
        Self {
            handles: HashMap::new(),
        }
    }
}

fn composite_key(prefix: &str, identifier: &str) -> String {
    format!("{prefix}{identifier}")
}

impl<H: Clone> AnnotationRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws `geometry` for `identifier`, replacing whatever was drawn under
    /// the same key.
    ///
    /// A missing or empty geometry leaves the surface and any existing entry
    /// untouched and returns false. A single part replacing a single part
    /// reuses the handle in place; any other shape change removes the old
    /// primitives and adds new ones.
    pub fn add_or_replace<S>(
        &mut self,
        surface: &mut S,
        identifier: &str,
        geometry: Option<&Geometry>,
        priority: Priority,
        highlighted: bool,
        prefix: &str,
    ) -> bool
    where
        S: DrawingSurface<Handle = H>,
    {
        let Some(geometry) = geometry.filter(|geometry| !geometry.is_empty()) else {
            return false;
        };
        let primitives: Vec<AnnotationPrimitive> = geometry
            .parts()
            .into_iter()
            .map(|part| AnnotationPrimitive {
                part,
                priority,
                highlighted,
            })
            .collect();
        if primitives.is_empty() {
            return false;
        }

        let key = composite_key(prefix, identifier);
        match self.handles.get_mut(&key) {
            Some(existing) if existing.len() == 1 && primitives.len() == 1 => {
                surface.replace_primitive(&existing[0], &primitives[0]);
                trace!(key = %key, "annotation replaced in place");
            }
            Some(existing) => {
                for handle in existing.drain(..) {
                    surface.remove_primitive(&handle);
                }
                existing.extend(
                    primitives
                        .iter()
                        .map(|primitive| surface.add_primitive(primitive)),
                );
                trace!(key = %key, parts = existing.len(), "annotation redrawn");
            }
            None => {
                let handles: Vec<H> = primitives
                    .iter()
                    .map(|primitive| surface.add_primitive(primitive))
                    .collect();
                trace!(key = %key, parts = handles.len(), "annotation added");
                self.handles.insert(key, handles);
            }
        }
        true
    }

    /// Removes the entries of `identifiers` under `prefix`. Unknown keys are
    /// skipped. Returns the number of entries removed.
    pub fn remove<'a, S>(
        &mut self,
        surface: &mut S,
        identifiers: impl IntoIterator<Item = &'a str>,
        prefix: &str,
    ) -> usize
    where
        S: DrawingSurface<Handle = H>,
    {
        let mut removed = 0;
        for identifier in identifiers {
            let Some(handles) = self.handles.remove(&composite_key(prefix, identifier)) else {
                continue;
            };
            for handle in &handles {
                surface.remove_primitive(handle);
            }
            removed += 1;
        }
        removed
    }

    /// Removes every entry from the surface.
    pub fn clear<S>(&mut self, surface: &mut S)
    where
        S: DrawingSurface<Handle = H>,
    {
        for (_, handles) in self.handles.drain() {
            for handle in &handles {
                surface.remove_primitive(handle);
            }
        }
    }

    pub fn contains(&self, identifier: &str, prefix: &str) -> bool {
        self.handles
            .contains_key(&composite_key(prefix, identifier))
    }

    pub fn handles(&self, identifier: &str, prefix: &str) -> Option<&[H]> {
        self.handles
            .get(&composite_key(prefix, identifier))
            .map(Vec::as_slice)
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Total number of live handles over all keys.
    pub fn primitive_count(&self) -> usize {
        self.handles.values().map(Vec::len).sum()
    }
}
