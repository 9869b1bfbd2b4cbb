//! Part placements and the contour replication table.
//!
//! `HKOST` registers a placement under its program id. A later `HKSTR` line
//! whose own `N` line number equals that id attaches its contour to every
//! placement registered under it, so one contour body backs several parts
//! at different sheet offsets.
//!
//! The lookup is keyed by the `HKSTR` line number, not by any argument of the
//! `HKSTR` call. Whether the dialect intends line numbers and program ids to
//! share a namespace is unconfirmed; the behavior is kept as observed.

use std::collections::HashMap;

use super::types::Point;

/// Index of a part in the program's part list.
pub type PartHandle = usize;

/// A placed part: where it sits on the sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Part receiving contours for this placement.
    pub part: PartHandle,
    /// Sheet offset from `HKOST` args 0 and 1.
    pub offset: Point,
}

/// Translate a contour-local point into sheet coordinates for one placement.
///
/// Applied exactly once per recorded coordinate. Inputs that already carry
/// sheet coordinates with a non-zero `HKOST` offset would be shifted twice.
pub fn apply_offset(local: Point, offset: Point) -> Point {
    Point::new(local.x + offset.x, local.y + offset.y)
}

/// Placements keyed by the program id they were registered under.
#[derive(Debug, Default)]
pub struct PlacementTable {
    by_key: HashMap<i64, Vec<Placement>>,
}

impl PlacementTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `placement` under `program_id`.
    pub fn register(&mut self, program_id: i64, placement: Placement) {
        self.by_key.entry(program_id).or_default().push(placement);
    }

    /// Placements an `HKSTR` on line `line_number` replicates to.
    pub fn lookup(&self, line_number: Option<i64>) -> &[Placement] {
        line_number
            .and_then(|key| self.by_key.get(&key))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
