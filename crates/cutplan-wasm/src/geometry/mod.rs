//! Polygon reconstruction: contour rings, boolean operations, part
//! footprints, and render meshes.

pub mod mesh;
pub mod ops;
pub mod parts;
pub mod ring;

pub use mesh::*;
pub use ops::*;
pub use parts::*;
pub use ring::*;
