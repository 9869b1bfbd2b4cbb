#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::indexing_slicing)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! `cutplan` WASM module: HK MPF laser program parsing, skeleton cut
//! planning and program rewriting.

pub mod config;
pub mod emit;
pub mod error;
pub mod geometry;
pub mod jobs;
pub mod mpf;
pub mod skeleton;
pub mod store;

use std::cell::RefCell;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::geometry::{build_polygons, triangulate, BoundingBox, GeoOps, RegionMesh};
use crate::mpf::Program;
use crate::skeleton::{SkeletonCut, SkeletonModel};

thread_local! {
    static LAST_MESH: RefCell<Option<RegionMesh>> = const { RefCell::new(None) };
}

fn store_mesh(mesh: RegionMesh) {
    LAST_MESH.with(|m| {
        *m.borrow_mut() = Some(mesh);
    });
}

/// Summary of the mesh stored by the last parse or skeleton call.
#[derive(Debug, Clone, Serialize)]
pub struct MeshMeta {
    /// Bounds of all mesh vertices.
    pub bounds: BoundingBox,
    /// Number of vertices.
    pub vertex_count: u32,
    /// Number of triangle indices.
    pub index_count: u32,
}

impl MeshMeta {
    fn of(mesh: &RegionMesh) -> Self {
        Self {
            bounds: mesh.bounds,
            vertex_count: mesh.vertex_count(),
            index_count: u32::try_from(mesh.indices.len()).unwrap_or(u32::MAX),
        }
    }
}

/// Initialize the WASM module. Sets up the panic hook for debugging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Parse an HK MPF program from raw bytes.
///
/// Returns the `Program` model as a `JsValue` via `serde-wasm-bindgen`.
/// The part footprint mesh is stored internally; retrieve it with
/// [`get_positions`] and [`get_indices`].
///
/// # Errors
///
/// Returns an error string if the model cannot be converted to a `JsValue`.
#[wasm_bindgen]
pub fn parse_mpf(data: &[u8]) -> Result<JsValue, JsValue> {
    let program = parse_mpf_internal(data);
    serde_wasm_bindgen::to_value(&program).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Internal parse logic shared between the wasm export and native tests.
#[doc(hidden)]
pub fn parse_mpf_internal(data: &[u8]) -> Program {
    let program = mpf::parse_bytes(data);
    store_mesh(triangulate(&build_polygons(&program)));
    program
}

/// Parse a program and plan its skeleton cuts.
///
/// Returns the `SkeletonModel` (program plus `skeletonCuts`). The scrap
/// region mesh is stored internally for [`get_positions`] / [`get_indices`].
///
/// # Errors
///
/// Returns an error string if the model cannot be converted to a `JsValue`.
#[wasm_bindgen]
pub fn plan_skeleton(data: &[u8]) -> Result<JsValue, JsValue> {
    let model = plan_skeleton_internal(data);
    serde_wasm_bindgen::to_value(&model).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Internal skeleton logic shared between the wasm export and native tests.
#[doc(hidden)]
pub fn plan_skeleton_internal(data: &[u8]) -> SkeletonModel {
    let program = mpf::parse_bytes(data);
    let polygons = build_polygons(&program);
    let scrap = skeleton::scrap_region(program.sheet, &polygons, &GeoOps);
    store_mesh(triangulate(&[scrap]));
    let skeleton_cuts = skeleton::plan(program.sheet, &polygons);
    SkeletonModel {
        program,
        skeleton_cuts,
    }
}

/// Reorder the contour blocks of a program.
///
/// `order` lists 1-based block indices in their new sequence.
///
/// # Errors
///
/// Returns the validation message if `order` is not a permutation of the
/// program's blocks or a block is unterminated.
#[wasm_bindgen]
pub fn reorder_mpf(data: &[u8], order: Vec<u32>) -> Result<String, JsValue> {
    reorder_internal(data, &order).map_err(|e| JsValue::from_str(&e))
}

/// Internal reorder logic shared between the wasm export and native tests.
#[doc(hidden)]
pub fn reorder_internal(data: &[u8], order: &[u32]) -> Result<String, String> {
    let text = String::from_utf8_lossy(data);
    emit::reorder(&text, order).map_err(|e| e.to_string())
}

/// Append skeleton cuts to a program as an extra part.
///
/// `cuts` is an array of `{id, a: [x, y], b: [x, y]}` as returned in
/// `skeletonCuts` by [`plan_skeleton`].
///
/// # Errors
///
/// Returns an error string if `cuts` has the wrong shape.
#[wasm_bindgen]
pub fn append_skeleton_mpf(data: &[u8], cuts: JsValue) -> Result<String, JsValue> {
    let cuts: Vec<SkeletonCut> =
        serde_wasm_bindgen::from_value(cuts).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(append_skeleton_internal(data, &cuts))
}

/// Internal append logic shared between the wasm export and native tests.
#[doc(hidden)]
pub fn append_skeleton_internal(data: &[u8], cuts: &[SkeletonCut]) -> String {
    let text = String::from_utf8_lossy(data);
    emit::append_skeleton(&text, cuts)
}

/// Bounds and buffer sizes of the stored mesh, or `null` before any parse.
///
/// # Errors
///
/// Returns an error string if the summary cannot be converted to a `JsValue`.
#[wasm_bindgen]
pub fn get_mesh_meta() -> Result<JsValue, JsValue> {
    let meta = LAST_MESH.with(|m| m.borrow().as_ref().map(MeshMeta::of));
    serde_wasm_bindgen::to_value(&meta).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Retrieve the position buffer of the last stored mesh.
///
/// Returns a copy of the interleaved `[x0, y0, x1, y1, ...]` positions.
/// Returns an empty array if nothing has been parsed yet.
#[wasm_bindgen]
pub fn get_positions() -> Vec<f32> {
    LAST_MESH.with(|m| {
        m.borrow()
            .as_ref()
            .map_or_else(Vec::new, |mesh| mesh.positions.clone())
    })
}

/// Retrieve the index buffer of the last stored mesh.
///
/// Returns a copy of the triangle-list indices.
/// Returns an empty array if nothing has been parsed yet.
#[wasm_bindgen]
pub fn get_indices() -> Vec<u32> {
    LAST_MESH.with(|m| {
        m.borrow()
            .as_ref()
            .map_or_else(Vec::new, |mesh| mesh.indices.clone())
    })
}
