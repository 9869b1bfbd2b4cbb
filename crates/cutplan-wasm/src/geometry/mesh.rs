//! Triangle meshes of regions for client-side rendering.
//!
//! Regions (part footprints, scrap material) are ear-clipped with `earclip`
//! into flat `f32` position and `u32` index buffers.

use geo::{LineString, Polygon};
use serde::Serialize;
use tracing::debug;

use super::ops::Region;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    /// Minimum X coordinate.
    pub min_x: f64,
    /// Minimum Y coordinate.
    pub min_y: f64,
    /// Maximum X coordinate.
    pub max_x: f64,
    /// Maximum Y coordinate.
    pub max_y: f64,
}

impl BoundingBox {
    /// Creates an empty bounding box that will expand with the first `update` call.
    pub const fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// Expands the bounding box to include the given point.
    pub fn update(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

/// Renderable triangle list.
///
/// Positions are interleaved `[x0, y0, x1, y1, ...]` as `f32` for WebGL.
#[derive(Debug, Clone, Default)]
pub struct RegionMesh {
    /// Interleaved vertex positions.
    pub positions: Vec<f32>,
    /// Triangle-list indices into the positions array.
    pub indices: Vec<u32>,
    /// Bounds of all vertices.
    pub bounds: BoundingBox,
}

impl RegionMesh {
    /// Number of vertices (`positions.len() / 2`).
    pub fn vertex_count(&self) -> u32 {
        u32::try_from(self.positions.len() / 2).unwrap_or(u32::MAX)
    }
}

/// Accumulator for building a mesh one polygon at a time.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    mesh: RegionMesh,
}

impl MeshBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex and returns its index.
    #[allow(clippy::cast_possible_truncation)]
    pub fn push_vertex(&mut self, x: f64, y: f64) -> u32 {
        let idx = self.mesh.vertex_count();
        self.mesh.positions.push(x as f32);
        self.mesh.positions.push(y as f32);
        self.mesh.bounds.update(x, y);
        idx
    }

    /// Adds a triangle from three vertex indices.
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.mesh.indices.extend_from_slice(&[a, b, c]);
    }

    /// Triangulates every polygon of `region`, holes included.
    pub fn push_region(&mut self, region: &Region) {
        for polygon in &region.0 {
            self.push_polygon(polygon);
        }
    }

    /// Triangulates one polygon with its interior rings as holes.
    pub fn push_polygon(&mut self, polygon: &Polygon<f64>) {
        let mut flat = Vec::new();
        let mut hole_starts = Vec::new();

        push_ring(&mut flat, polygon.exterior());
        for interior in polygon.interiors() {
            hole_starts.push(flat.len() / 2);
            push_ring(&mut flat, interior);
        }

        if flat.len() < 6 {
            debug!(points = flat.len() / 2, "degenerate polygon skipped");
            return;
        }

        let triangles = earclip::earcut::earcut(&flat, &hole_starts, 2);
        if triangles.is_empty() {
            debug!("earclip produced no triangles; polygon skipped");
            return;
        }

        let base = self.mesh.vertex_count();
        for pair in flat.chunks_exact(2) {
            if let [x, y] = *pair {
                self.push_vertex(x, y);
            }
        }

        for tri in triangles.chunks_exact(3) {
            if let [a, b, c] = *tri {
                let (Some(a), Some(b), Some(c)) = (
                    offset_index(base, a),
                    offset_index(base, b),
                    offset_index(base, c),
                ) else {
                    debug!("vertex index overflow; triangle skipped");
                    continue;
                };
                self.push_triangle(a, b, c);
            }
        }
    }

    /// Consumes the builder and returns the mesh.
    pub fn build(self) -> RegionMesh {
        self.mesh
    }
}

/// Mesh of all `regions`.
pub fn triangulate(regions: &[Region]) -> RegionMesh {
    let mut builder = MeshBuilder::new();
    for region in regions {
        builder.push_region(region);
    }
    builder.build()
}

/// Ring coordinates without the closing duplicate.
fn push_ring(flat: &mut Vec<f64>, ring: &LineString<f64>) {
    let coords = &ring.0;
    let open_len = if ring.is_closed() && coords.len() > 1 {
        coords.len() - 1
    } else {
        coords.len()
    };
    for coord in coords.iter().take(open_len) {
        flat.push(coord.x);
        flat.push(coord.y);
    }
}

fn offset_index(base: u32, offset: usize) -> Option<u32> {
    base.checked_add(u32::try_from(offset).ok()?)
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use geo::{Coord, LineString};

    use super::*;

    fn ring(points: &[(f64, f64)]) -> LineString<f64> {
        LineString::from(
            points
                .iter()
                .map(|&(x, y)| Coord { x, y })
                .collect::<Vec<_>>(),
        )
    }

    fn triangle_area_sum(mesh: &RegionMesh) -> f64 {
        let vertex = |i: u32| {
            let at = i as usize * 2;
            (f64::from(mesh.positions[at]), f64::from(mesh.positions[at + 1]))
        };
        mesh.indices
            .chunks_exact(3)
            .map(|tri| {
                let (ax, ay) = vertex(tri[0]);
                let (bx, by) = vertex(tri[1]);
                let (cx, cy) = vertex(tri[2]);
                ((bx - ax) * (cy - ay) - (cx - ax) * (by - ay)).abs() / 2.0
            })
            .sum()
    }

    #[test]
    fn square_produces_two_triangles() {
        let square = Polygon::new(
            ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]),
            Vec::new(),
        );
        let mesh = triangulate(&[Region::new(vec![square])]);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices.len(), 6);
        assert!((mesh.bounds.max_x - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn hole_is_left_uncovered() {
        let framed = Polygon::new(
            ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]),
            vec![ring(&[(1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0), (1.0, 1.0)])],
        );
        let mesh = triangulate(&[Region::new(vec![framed])]);
        assert_eq!(mesh.vertex_count(), 8);
        assert!((triangle_area_sum(&mesh) - 12.0).abs() < 1e-3);
    }

    #[test]
    fn indices_are_offset_per_polygon() {
        let a = Polygon::new(
            ring(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)]),
            Vec::new(),
        );
        let b = Polygon::new(
            ring(&[(5.0, 5.0), (6.0, 5.0), (5.0, 6.0), (5.0, 5.0)]),
            Vec::new(),
        );
        let mesh = triangulate(&[Region::new(vec![a]), Region::new(vec![b])]);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.indices.len(), 6);
        assert!(mesh.indices[3..].iter().all(|&i| i >= 3));
    }

    #[test]
    fn empty_input_builds_empty_mesh() {
        let mesh = triangulate(&[]);
        assert!(mesh.positions.is_empty());
        assert!(mesh.indices.is_empty());
    }
}
