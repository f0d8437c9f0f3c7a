//! Vector geometry carried by quality errors.
//!
//! Only what the index and the map synchronizer need: splitting into
//! single-part primitives and a bounding box for extent filtering.

use serde::{Deserialize, Serialize};

/// A 2D coordinate in the layer's reference system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Error location geometry, possibly multi-part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Coord),
    LineString(Vec<Coord>),
    /// Exterior ring followed by interior rings.
    Polygon(Vec<Vec<Coord>>),
    MultiPoint(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    MultiPolygon(Vec<Vec<Vec<Coord>>>),
}

/// One single-part piece of a geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeometryPart {
    Point(Coord),
    Line(Vec<Coord>),
    Polygon(Vec<Vec<Coord>>),
}

impl Geometry {
    /// True when the geometry has no coordinates at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point(_) => false,
            Geometry::LineString(coords) | Geometry::MultiPoint(coords) => coords.is_empty(),
            Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
                rings.iter().all(Vec::is_empty)
            }
            Geometry::MultiPolygon(polygons) => polygons.iter().flatten().all(Vec::is_empty),
        }
    }

    /// Splits the geometry into single-part pieces. Empty parts are skipped.
    pub fn parts(&self) -> Vec<GeometryPart> {
        match self {
            Geometry::Point(coord) => vec![GeometryPart::Point(*coord)],
            Geometry::LineString(coords) if coords.is_empty() => Vec::new(),
            Geometry::LineString(coords) => vec![GeometryPart::Line(coords.clone())],
            Geometry::Polygon(rings) if rings.iter().all(Vec::is_empty) => Vec::new(),
            Geometry::Polygon(rings) => vec![GeometryPart::Polygon(rings.clone())],
            Geometry::MultiPoint(coords) => {
                coords.iter().copied().map(GeometryPart::Point).collect()
            }
            Geometry::MultiLineString(lines) => lines
                .iter()
                .filter(|line| !line.is_empty())
                .map(|line| GeometryPart::Line(line.clone()))
                .collect(),
            Geometry::MultiPolygon(polygons) => polygons
                .iter()
                .filter(|rings| !rings.iter().all(Vec::is_empty))
                .map(|rings| GeometryPart::Polygon(rings.clone()))
                .collect(),
        }
    }

    /// Axis-aligned bounding box, `None` for empty geometries.
    pub fn bounding_box(&self) -> Option<Extent> {
        let coords: Vec<Coord> = match self {
            Geometry::Point(coord) => vec![*coord],
            Geometry::LineString(coords) | Geometry::MultiPoint(coords) => coords.clone(),
            Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
                rings.iter().flatten().copied().collect()
            }
            Geometry::MultiPolygon(polygons) => {
                polygons.iter().flatten().flatten().copied().collect()
            }
        };
        Extent::from_coords(&coords)
    }
}

/// Axis-aligned rectangle, used for map extents and bounding boxes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Creates an extent, normalizing swapped corners.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    pub fn from_coords(coords: &[Coord]) -> Option<Self> {
        let first = coords.first()?;
        let mut extent = Self::new(first.x, first.y, first.x, first.y);
        for coord in &coords[1..] {
            extent.min_x = extent.min_x.min(coord.x);
            extent.min_y = extent.min_y.min(coord.y);
            extent.max_x = extent.max_x.max(coord.x);
            extent.max_y = extent.max_y.max(coord.y);
        }
        Some(extent)
    }

    /// Closed-interval intersection test; touching edges intersect.
    pub fn intersects(&self, other: &Extent) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }
}
