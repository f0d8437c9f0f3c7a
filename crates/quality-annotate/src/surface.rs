//! Drawing surface abstraction.

use std::fmt::Debug;

use quality_model::{GeometryPart, Priority};

/// One drawn single-part geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationPrimitive {
    pub part: GeometryPart,
    pub priority: Priority,
    /// Drawn with the selection style.
    pub highlighted: bool,
}

/// Map layer that annotations are drawn on.
///
/// Handles are opaque to the registry; it only stores them and hands them
/// back to the surface.
pub trait DrawingSurface {
    type Handle: Clone + Debug;

    fn add_primitive(&mut self, primitive: &AnnotationPrimitive) -> Self::Handle;

    /// Swaps the primitive behind `handle`, keeping the handle valid.
    fn replace_primitive(&mut self, handle: &Self::Handle, primitive: &AnnotationPrimitive);

    fn remove_primitive(&mut self, handle: &Self::Handle);
}

impl<S: DrawingSurface + ?Sized> DrawingSurface for &mut S {
    type Handle = S::Handle;

    fn add_primitive(&mut self, primitive: &AnnotationPrimitive) -> Self::Handle {
        (**self).add_primitive(primitive)
    }

    fn replace_primitive(&mut self, handle: &Self::Handle, primitive: &AnnotationPrimitive) {
        (**self).replace_primitive(handle, primitive);
    }

    fn remove_primitive(&mut self, handle: &Self::Handle) {
        (**self).remove_primitive(handle);
    }
}
