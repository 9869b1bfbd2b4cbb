//! Net part footprints from parsed contours.

use tracing::debug;

use crate::config::CutplanConfig;
use crate::mpf::{ContourKind, Part, Program};

use super::ops::{ring_to_region, GeoOps, PolygonOps, Region};
use super::ring::contour_to_ring;

/// One net polygon per part, using the `geo` backend and default tolerance.
///
/// Parts without a usable outer ring, or whose footprint ends up empty, are
/// dropped.
pub fn build_polygons(program: &Program) -> Vec<Region> {
    build_polygons_with(program, &GeoOps, &CutplanConfig::default())
}

/// [`build_polygons`] with an explicit backend and configuration.
pub fn build_polygons_with(
    program: &Program,
    ops: &impl PolygonOps,
    config: &CutplanConfig,
) -> Vec<Region> {
    program
        .parts
        .iter()
        .enumerate()
        .filter_map(|(index, part)| {
            let footprint = part_footprint(part, ops, config.join_tolerance);
            if footprint.is_none() {
                debug!(part = index, "part produced no footprint; dropped");
            }
            footprint
        })
        .collect()
}

/// Outer union minus the holes that lie wholly inside it.
fn part_footprint(part: &Part, ops: &impl PolygonOps, tolerance: f64) -> Option<Region> {
    let mut outers = Vec::new();
    let mut holes = Vec::new();

    for contour in &part.contours {
        let Some(ring) = contour_to_ring(contour, tolerance) else {
            debug!(contour = contour.id, "contour does not form a ring; dropped");
            continue;
        };
        let shape = ops.normalize(&ring_to_region(&ring));
        if shape.0.is_empty() {
            continue;
        }
        match contour.kind {
            ContourKind::Outer => outers.push(shape),
            ContourKind::Hole => holes.push(shape),
        }
    }

    if outers.is_empty() {
        return None;
    }

    let body = ops.union_all(&outers);
    let inside: Vec<Region> = holes
        .into_iter()
        .filter(|hole| ops.is_within(hole, &body))
        .collect();

    let net = if inside.is_empty() {
        body
    } else {
        let cutouts = ops.intersection(&ops.union_all(&inside), &body);
        ops.difference(&body, &cutouts)
    };

    (!net.0.is_empty()).then_some(net)
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use geo::Area;

    use crate::mpf::parse;

    use super::*;

    fn square_block(kind: u8, x: f64, y: f64, size: f64) -> String {
        format!(
            "HKSTR({kind},1,{x},{y})\nHKCUT\nG1 X{} Y{y}\nG1 X{} Y{}\nG1 X{x} Y{}\nG1 X{x} Y{y}\nHKSTO\n",
            x + size,
            x + size,
            y + size,
            y + size,
        )
    }

    #[test]
    fn hole_inside_outer_is_subtracted() {
        let text = format!(
            "HKINI(0,20,20)\nHKOST(0,0,0,1,1)\n{}{}HKPED\n",
            square_block(0, 0.0, 0.0, 10.0),
            square_block(1, 2.0, 2.0, 2.0),
        );
        let polygons = build_polygons(&parse(&text));
        assert_eq!(polygons.len(), 1);
        assert!((polygons[0].unsigned_area() - 96.0).abs() < 1e-6);
    }

    #[test]
    fn hole_outside_outer_is_ignored() {
        let text = format!(
            "HKOST(0,0,0,1,1)\n{}{}HKPED\n",
            square_block(0, 0.0, 0.0, 10.0),
            square_block(1, 9.0, 2.0, 2.0),
        );
        let polygons = build_polygons(&parse(&text));
        assert_eq!(polygons.len(), 1);
        assert!((polygons[0].unsigned_area() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn multiple_outers_are_unioned() {
        let text = format!(
            "HKOST(0,0,0,1,1)\n{}{}HKPED\n",
            square_block(0, 0.0, 0.0, 2.0),
            square_block(0, 1.0, 0.0, 2.0),
        );
        let polygons = build_polygons(&parse(&text));
        assert_eq!(polygons.len(), 1);
        assert!((polygons[0].unsigned_area() - 6.0).abs() < 1e-6);
    }

    #[test]
    fn parts_without_outer_ring_are_dropped() {
        let text = format!(
            "HKOST(0,0,0,1,1)\n{}HKPED\nHKOST(0,0,0,2,1)\nHKSTR(0,1,0,0)\nHKCUT\nG1 X1\nHKSTO\nHKPED\n",
            square_block(1, 0.0, 0.0, 2.0),
        );
        let program = parse(&text);
        assert_eq!(program.parts.len(), 2);
        assert!(build_polygons(&program).is_empty());
    }

    #[test]
    fn arc_contour_builds_disc() {
        let text = "HKOST(0,0,0,1,1)\nHKSTR(0,1,5,0)\nHKCUT\nG3 X5 Y0 I-5 J0\nHKSTO\nHKPED\n";
        let polygons = build_polygons(&parse(text));
        assert_eq!(polygons.len(), 1);
        let area = polygons[0].unsigned_area();
        let circle = std::f64::consts::PI * 25.0;
        assert!(area < circle && area > circle * 0.98, "area {area}");
    }
}
