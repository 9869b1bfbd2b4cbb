//! Tunable parameters for parsing, skeleton planning, and program emission.
//!
//! Every entry point has a default-config form; the `*_with_config` variants
//! take a [`CutplanConfig`] so hosts can override individual values.

use serde::{Deserialize, Serialize};

/// Top-level configuration shared by all pipeline stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutplanConfig {
    /// Arc tessellation parameters.
    pub arc: ArcSettings,
    /// Maximum gap between chained points that still counts as a join.
    pub join_tolerance: f64,
    /// Skeleton probe grid parameters.
    pub skeleton: SkeletonSettings,
    /// Synthetic skeleton block emission parameters.
    pub emit: EmitSettings,
}

impl Default for CutplanConfig {
    fn default() -> Self {
        Self {
            arc: ArcSettings::default(),
            join_tolerance: 1e-4,
            skeleton: SkeletonSettings::default(),
            emit: EmitSettings::default(),
        }
    }
}

/// Arc-to-polyline tessellation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcSettings {
    /// Maximum angular step between sampled points, in degrees.
    pub step_degrees: f64,
    /// Minimum number of steps for any arc.
    pub min_segments: u32,
}

impl Default for ArcSettings {
    fn default() -> Self {
        Self {
            step_degrees: 6.0,
            min_segments: 8,
        }
    }
}

/// Probe-line layout for the skeleton planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeletonSettings {
    /// Horizontal probes at `y = height * f` for each fraction.
    pub horizontal_fractions: Vec<f64>,
    /// Vertical probes at `x = width * f` for each fraction.
    pub vertical_fractions: Vec<f64>,
    /// Cuts this short or shorter are dropped.
    pub min_cut_length: f64,
}

impl Default for SkeletonSettings {
    fn default() -> Self {
        Self {
            horizontal_fractions: vec![0.25, 0.5, 0.75],
            vertical_fractions: vec![1.0 / 3.0, 2.0 / 3.0],
            min_cut_length: 1e-4,
        }
    }
}

/// Identifiers and formatting for the synthetic skeleton part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitSettings {
    /// Program id reserved for the skeleton part header.
    pub program_id: i64,
    /// Technology code reserved for the skeleton part header.
    pub tech: i64,
    /// First `N` line number of the synthetic block.
    pub line_base: u64,
    /// Increment between synthetic line numbers.
    pub line_step: u64,
    /// Decimal places for emitted coordinates.
    pub precision: usize,
}

impl Default for EmitSettings {
    fn default() -> Self {
        Self {
            program_id: 990_001,
            tech: 99,
            line_base: 900_000,
            line_step: 10,
            precision: 4,
        }
    }
}
