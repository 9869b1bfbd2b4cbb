//! Contour-to-ring conversion.

use crate::mpf::{Contour, Point, Segment};

/// Minimum number of points (closing point included) for a usable ring.
const MIN_RING_POINTS: usize = 4;

/// Flatten a contour into a closed point ring.
///
/// Lines contribute their end points (plus the very first start point);
/// polylines contribute all points, dropping the first one when it repeats
/// the previous point within `tolerance`. Rings with fewer than four points
/// are rejected. The ring is closed by repeating the first point when its
/// ends are more than `tolerance` apart.
pub fn contour_to_ring(contour: &Contour, tolerance: f64) -> Option<Vec<Point>> {
    let mut points: Vec<Point> = Vec::new();

    for segment in &contour.segments {
        match segment {
            Segment::Line { a, b } => {
                if points.is_empty() {
                    points.push(*a);
                }
                points.push(*b);
            }
            Segment::Polyline { points: arc } => {
                let skip_first = match (points.last(), arc.first()) {
                    (Some(last), Some(first)) => last.approx_eq(*first, tolerance),
                    _ => false,
                };
                points.extend(arc.iter().skip(usize::from(skip_first)));
            }
        }
    }

    if points.len() < MIN_RING_POINTS {
        return None;
    }

    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return None;
    };
    if !first.approx_eq(last, tolerance) {
        points.push(first);
    }

    Some(points)
}
