//! Skeleton cut planning.
//!
//! The scrap left on the sheet once every part is removed is probed with a
//! fixed grid of horizontal and vertical lines. Each stretch of a probe that
//! runs through scrap only becomes a straight skeleton cut.

use geo::{Coord, LineString, MultiLineString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{CutplanConfig, SkeletonSettings};
use crate::geometry::{build_polygons_with, rectangle, GeoOps, PolygonOps, Region};
use crate::mpf::{Point, Program, Sheet};

/// A straight scrap-clearing cut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkeletonCut {
    /// Sequential id in probe order, starting at 1.
    pub id: u32,
    /// Start of the chord.
    pub a: Point,
    /// End of the chord.
    pub b: Point,
}

impl SkeletonCut {
    /// Chord length.
    pub fn length(&self) -> f64 {
        self.a.distance(self.b)
    }
}

/// Parsed program plus its skeleton cuts, for display.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SkeletonModel {
    /// The parsed program.
    #[serde(flatten)]
    pub program: Program,
    /// Planned cuts.
    #[serde(rename = "skeletonCuts")]
    pub skeleton_cuts: Vec<SkeletonCut>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy)]
struct Probe {
    axis: Axis,
    from: Point,
    to: Point,
}

impl Probe {
    /// Position along the probe direction.
    const fn along(&self, p: Point) -> f64 {
        match self.axis {
            Axis::Horizontal => p.x,
            Axis::Vertical => p.y,
        }
    }
}

/// Plan skeleton cuts for `sheet` with the default backend and settings.
pub fn plan(sheet: Sheet, part_polygons: &[Region]) -> Vec<SkeletonCut> {
    plan_with(sheet, part_polygons, &GeoOps, &SkeletonSettings::default())
}

/// Parse-to-cuts convenience: build part footprints and plan against them.
pub fn compute_skeleton(program: &Program) -> SkeletonModel {
    compute_skeleton_with_config(program, &CutplanConfig::default())
}

/// [`compute_skeleton`] with explicit configuration.
pub fn compute_skeleton_with_config(program: &Program, config: &CutplanConfig) -> SkeletonModel {
    let polygons = build_polygons_with(program, &GeoOps, config);
    let skeleton_cuts = plan_with(program.sheet, &polygons, &GeoOps, &config.skeleton);
    SkeletonModel {
        program: program.clone(),
        skeleton_cuts,
    }
}

/// Sheet material left after removing every part: `sheet - union(parts)`.
pub fn scrap_region(sheet: Sheet, part_polygons: &[Region], ops: &impl PolygonOps) -> Region {
    material(sheet, part_polygons, ops).0
}

/// Scrap region and parts union, both normalized.
fn material(sheet: Sheet, part_polygons: &[Region], ops: &impl PolygonOps) -> (Region, Region) {
    let parts_union = ops.union_all(part_polygons);
    if !has_area(sheet) {
        return (Region::new(Vec::new()), parts_union);
    }
    let sheet_poly = ops.normalize(&rectangle(sheet.width, sheet.height));
    let scrap = ops.normalize(&ops.difference(&sheet_poly, &parts_union));
    (scrap, parts_union)
}

/// Plan skeleton cuts with an explicit backend and probe layout.
pub fn plan_with(
    sheet: Sheet,
    part_polygons: &[Region],
    ops: &impl PolygonOps,
    settings: &SkeletonSettings,
) -> Vec<SkeletonCut> {
    if !has_area(sheet) {
        debug!("sheet has no area; no skeleton cuts");
        return Vec::new();
    }

    let (scrap, parts_union) = material(sheet, part_polygons, ops);
    if scrap.0.is_empty() {
        debug!("sheet fully covered by parts; no skeleton cuts");
        return Vec::new();
    }

    let mut chords = Vec::new();
    for probe in probes(sheet, settings) {
        chords.extend(clear_stretches(
            &probe,
            &scrap,
            &parts_union,
            ops,
            settings.min_cut_length,
        ));
    }

    let cuts: Vec<SkeletonCut> = chords
        .into_iter()
        .zip(1u32..)
        .map(|((a, b), id)| SkeletonCut { id, a, b })
        .collect();
    debug!(cuts = cuts.len(), "planned skeleton cuts");
    cuts
}

fn has_area(sheet: Sheet) -> bool {
    sheet.width.is_finite() && sheet.height.is_finite() && sheet.width > 0.0 && sheet.height > 0.0
}

/// Horizontal probes first, then vertical, each across the whole sheet.
fn probes(sheet: Sheet, settings: &SkeletonSettings) -> Vec<Probe> {
    let horizontal = settings.horizontal_fractions.iter().map(|f| {
        let y = sheet.height * f;
        Probe {
            axis: Axis::Horizontal,
            from: Point::new(0.0, y),
            to: Point::new(sheet.width, y),
        }
    });
    let vertical = settings.vertical_fractions.iter().map(|f| {
        let x = sheet.width * f;
        Probe {
            axis: Axis::Vertical,
            from: Point::new(x, 0.0),
            to: Point::new(x, sheet.height),
        }
    });
    horizontal.chain(vertical).collect()
}

/// Chords of `probe` that run through scrap, ordered along the probe.
fn clear_stretches(
    probe: &Probe,
    scrap: &Region,
    parts_union: &Region,
    ops: &impl PolygonOps,
    min_length: f64,
) -> Vec<(Point, Point)> {
    let line = MultiLineString::new(vec![LineString::from(vec![
        Coord {
            x: probe.from.x,
            y: probe.from.y,
        },
        Coord {
            x: probe.to.x,
            y: probe.to.y,
        },
    ])]);

    let inside = ops.clip_lines(scrap, &line, false);
    if inside.0.is_empty() {
        return Vec::new();
    }
    // Second pass against the parts themselves guards against normalization
    // slivers left in the scrap region.
    let clear = ops.clip_lines(parts_union, &inside, true);

    let mut chords: Vec<(Point, Point)> = clear
        .0
        .iter()
        .filter(|piece| polyline_length(piece) > min_length)
        .filter_map(|piece| {
            let first = piece.0.first()?;
            let last = piece.0.last()?;
            let a = Point::new(first.x, first.y);
            let b = Point::new(last.x, last.y);
            Some(if probe.along(a) <= probe.along(b) {
                (a, b)
            } else {
                (b, a)
            })
        })
        .collect();

    chords.sort_by(|left, right| probe.along(left.0).total_cmp(&probe.along(right.0)));
    chords
}

fn polyline_length(line: &LineString<f64>) -> f64 {
    line.0
        .windows(2)
        .map(|pair| match pair {
            [p, q] => (q.x - p.x).hypot(q.y - p.y),
            _ => 0.0,
        })
        .sum()
}
