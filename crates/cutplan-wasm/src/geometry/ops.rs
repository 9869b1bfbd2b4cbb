//! Polygon boolean capability and its `geo` backend.
//!
//! The parser and emitter never touch polygons; everything that needs
//! union/difference/clipping goes through [`PolygonOps`] so the backend can
//! be swapped without touching the rest of the pipeline.

use geo::{Area, BooleanOps, Coord, LineString, MultiLineString, MultiPolygon, Polygon};

use crate::mpf::Point;

/// Relative area slack when deciding containment.
const WITHIN_AREA_TOLERANCE: f64 = 1e-9;

/// Net material footprint of one part, or any other region.
pub type Region = MultiPolygon<f64>;

/// Boolean operations on regions and region/line clipping.
///
/// Implementations must not panic on irregular input: self-intersecting or
/// empty operands yield smaller or empty results.
pub trait PolygonOps {
    /// Repair minor self-intersections and orientation (buffer-by-zero).
    fn normalize(&self, shape: &Region) -> Region;

    /// Union of `a` and `b`.
    fn union(&self, a: &Region, b: &Region) -> Region;

    /// `a` minus `b`.
    fn difference(&self, a: &Region, b: &Region) -> Region;

    /// Overlap of `a` and `b`.
    fn intersection(&self, a: &Region, b: &Region) -> Region;

    /// Portions of `lines` inside `shape`, or outside it when `outside` is set.
    fn clip_lines(
        &self,
        shape: &Region,
        lines: &MultiLineString<f64>,
        outside: bool,
    ) -> MultiLineString<f64>;

    /// Whether `inner` lies wholly within `outer`.
    fn is_within(&self, inner: &Region, outer: &Region) -> bool;

    /// Union of every shape in `shapes`; empty for no shapes.
    fn union_all(&self, shapes: &[Region]) -> Region {
        shapes
            .iter()
            .fold(Region::new(Vec::new()), |acc, shape| self.union(&acc, shape))
    }
}

/// [`PolygonOps`] backed by the `geo` crate's boolean operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoOps;

impl PolygonOps for GeoOps {
    fn normalize(&self, shape: &Region) -> Region {
        shape.union(&Region::new(Vec::new()))
    }

    fn union(&self, a: &Region, b: &Region) -> Region {
        a.union(b)
    }

    fn difference(&self, a: &Region, b: &Region) -> Region {
        if b.0.is_empty() {
            return self.normalize(a);
        }
        a.difference(b)
    }

    fn intersection(&self, a: &Region, b: &Region) -> Region {
        if a.0.is_empty() || b.0.is_empty() {
            return Region::new(Vec::new());
        }
        a.intersection(b)
    }

    fn clip_lines(
        &self,
        shape: &Region,
        lines: &MultiLineString<f64>,
        outside: bool,
    ) -> MultiLineString<f64> {
        if shape.0.is_empty() {
            return if outside {
                lines.clone()
            } else {
                MultiLineString::new(Vec::new())
            };
        }
        shape.clip(lines, outside)
    }

    fn is_within(&self, inner: &Region, outer: &Region) -> bool {
        let inner_area = inner.unsigned_area();
        if outer.0.is_empty() {
            return inner_area <= f64::EPSILON;
        }
        let spill = inner.difference(outer).unsigned_area();
        spill <= WITHIN_AREA_TOLERANCE * inner_area.max(1.0)
    }
}

/// Closed point ring as a single-polygon region.
pub fn ring_to_region(ring: &[Point]) -> Region {
    let exterior: Vec<Coord<f64>> = ring.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
    Region::new(vec![Polygon::new(LineString::from(exterior), Vec::new())])
}

/// Axis-aligned rectangle `(0, 0)..(width, height)`.
pub fn rectangle(width: f64, height: f64) -> Region {
    ring_to_region(&[
        Point::new(0.0, 0.0),
        Point::new(width, 0.0),
        Point::new(width, height),
        Point::new(0.0, height),
        Point::new(0.0, 0.0),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Region {
        ring_to_region(&[
            Point::new(x, y),
            Point::new(x + size, y),
            Point::new(x + size, y + size),
            Point::new(x, y + size),
            Point::new(x, y),
        ])
    }

    #[test]
    fn union_of_overlapping_squares_merges_area() {
        let merged = GeoOps.union(&square(0.0, 0.0, 2.0), &square(1.0, 0.0, 2.0));
        assert!((merged.unsigned_area() - 6.0).abs() < 1e-6);
        assert_eq!(merged.0.len(), 1);
    }

    #[test]
    fn difference_with_empty_is_identity() {
        let result = GeoOps.difference(&square(0.0, 0.0, 3.0), &Region::new(Vec::new()));
        assert!((result.unsigned_area() - 9.0).abs() < 1e-6);
    }

    #[test]
    fn union_all_of_nothing_is_empty() {
        assert!(GeoOps.union_all(&[]).0.is_empty());
    }

    #[test]
    fn normalize_repairs_clockwise_ring() {
        let clockwise = ring_to_region(&[
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 0.0),
        ]);
        let normalized = GeoOps.normalize(&clockwise);
        assert!((normalized.unsigned_area() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn containment_checks() {
        let outer = square(0.0, 0.0, 10.0);
        assert!(GeoOps.is_within(&square(2.0, 2.0, 1.0), &outer));
        assert!(!GeoOps.is_within(&square(9.5, 2.0, 1.0), &outer));
        assert!(!GeoOps.is_within(&square(20.0, 2.0, 1.0), &outer));
    }

    #[test]
    fn clip_keeps_inside_or_outside() {
        let shape = square(2.0, 0.0, 2.0);
        let lines = MultiLineString::new(vec![LineString::from(vec![(0.0, 1.0), (6.0, 1.0)])]);

        let inside = GeoOps.clip_lines(&shape, &lines, false);
        let outside = GeoOps.clip_lines(&shape, &lines, true);
        assert_eq!(inside.0.len(), 1);
        assert_eq!(outside.0.len(), 2);
    }

    #[test]
    fn clip_against_empty_region() {
        let lines = MultiLineString::new(vec![LineString::from(vec![(0.0, 1.0), (6.0, 1.0)])]);
        let empty = Region::new(Vec::new());
        assert!(GeoOps.clip_lines(&empty, &lines, false).0.is_empty());
        assert_eq!(GeoOps.clip_lines(&empty, &lines, true), lines);
    }
}
