//! Map annotations for quality errors.
//!
//! [`AnnotationRegistry`] tracks which primitives are drawn for which error,
//! [`ErrorVisualizer`] adds the selected overlay and the show/hide switch on
//! top of it. Drawing itself is delegated to a [`DrawingSurface`].

pub mod registry;
pub mod surface;
pub mod visualizer;

pub use registry::AnnotationRegistry;
pub use surface::{AnnotationPrimitive, DrawingSurface};
pub use visualizer::{ErrorFeature, ErrorVisualizer, SELECTED_PREFIX};
