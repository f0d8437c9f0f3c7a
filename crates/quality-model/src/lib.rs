pub mod enums;
pub mod error;
pub mod geometry;
pub mod mapping;
pub mod record;

pub use enums::{ErrorType, Priority, USER_PROCESSED_LABEL};
pub use error::ModelError;
pub use geometry::{Coord, Extent, Geometry, GeometryPart};
pub use mapping::{LayerAlias, LayerMapping};
pub use record::{ErrorRecord, LocalizedText, distinct_attribute_names, distinct_feature_types};
