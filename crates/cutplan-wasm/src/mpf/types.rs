//! Geometric model of a parsed HK MPF program.

use serde::{Deserialize, Serialize};

/// 2D point in sheet coordinates (program units, inches).
///
/// Serialized as a `[x, y]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy).sqrt()
    }

    /// Whether both coordinates are within `tolerance` of `other`.
    pub fn approx_eq(self, other: Self, tolerance: f64) -> bool {
        self.distance(other) <= tolerance
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Sheet dimensions from `HKINI`. Zero until set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sheet {
    /// Sheet width.
    pub width: f64,
    /// Sheet height.
    pub height: f64,
}

/// One recorded cut move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment {
    /// Straight `G1` move.
    Line {
        /// Start point.
        a: Point,
        /// End point.
        b: Point,
    },
    /// Tessellated `G2`/`G3` arc; always at least two points.
    Polyline {
        /// Sampled points from arc start to arc end.
        points: Vec<Point>,
    },
}

impl Segment {
    /// First point of the segment.
    pub fn start(&self) -> Option<Point> {
        match self {
            Self::Line { a, .. } => Some(*a),
            Self::Polyline { points } => points.first().copied(),
        }
    }

    /// Last point of the segment.
    pub fn end(&self) -> Option<Point> {
        match self {
            Self::Line { b, .. } => Some(*b),
            Self::Polyline { points } => points.last().copied(),
        }
    }
}

/// Whether a contour bounds material or removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContourKind {
    /// Outer boundary of a part.
    Outer,
    /// Hole inside a part.
    Hole,
}

/// One continuous cut path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    /// Sequential id across the whole program, starting at 1.
    pub id: u32,
    /// Outer or hole.
    #[serde(rename = "type")]
    pub kind: ContourKind,
    /// Chained cut moves.
    pub segments: Vec<Segment>,
}

/// One placed part and its contours.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Part {
    /// Program id from `HKOST`, if given.
    pub program_id: Option<i64>,
    /// Technology code from `HKOST`, if given.
    pub tech: Option<i64>,
    /// Contours attached to this placement.
    pub contours: Vec<Contour>,
}

/// Parser output: the sheet and every part cut from it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    /// Sheet dimensions.
    pub sheet: Sheet,
    /// Parts in declaration order.
    pub parts: Vec<Part>,
}

impl Program {
    /// Iterates every contour across all parts.
    pub fn contours(&self) -> impl Iterator<Item = &Contour> {
        self.parts.iter().flat_map(|part| part.contours.iter())
    }
}
