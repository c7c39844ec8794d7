//! Distance-based subdivision factors with crack-free shared edges.
//!
//! Each patch corner is transformed into eye space and its depth mapped to a
//! normalized distance in `[0, 1]`. An edge's factor is a function of its own
//! two endpoint distances only, so the two patches on either side of an edge
//! always agree on it, whatever their other corners look like. Inner factors
//! take the larger factor of each pair of opposite edges.

use rayon::prelude::*;
use relief_config::{ConfigError, EdgeDistance, LodConfig};
use relief_terrain::{Patch, PatchEdge, PatchGrid};

use crate::frame::FrameContext;

/// Per-patch subdivision counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubdivisionFactors {
    /// One factor per edge, indexed by [`PatchEdge`] discriminant.
    pub outer: [u32; 4],
    /// `[u-direction, v-direction]` interior factors.
    pub inner: [u32; 2],
}

impl SubdivisionFactors {
    /// Derive inner factors from outer ones:
    /// `inner[0] = max(outer[1], outer[3])`, `inner[1] = max(outer[0], outer[2])`.
    pub fn from_outer(outer: [u32; 4]) -> Self {
        Self {
            outer,
            inner: [outer[1].max(outer[3]), outer[0].max(outer[2])],
        }
    }

    /// Every edge and the interior at `level`.
    pub fn uniform(level: u32) -> Self {
        Self::from_outer([level; 4])
    }

    /// Factor of `edge`.
    pub fn edge(&self, edge: PatchEdge) -> u32 {
        self.outer[edge as usize]
    }

    /// Largest of the six factors.
    pub fn max_level(&self) -> u32 {
        self.outer
            .iter()
            .chain(self.inner.iter())
            .copied()
            .max()
            .unwrap_or(0)
    }

    /// Smallest of the six factors.
    pub fn min_level(&self) -> u32 {
        self.outer
            .iter()
            .chain(self.inner.iter())
            .copied()
            .min()
            .unwrap_or(0)
    }
}

/// Maps eye-space depth to subdivision factors.
///
/// Level interpolation rounds to the nearest integer (halves away from zero).
#[derive(Clone, Debug)]
pub struct LodController {
    min_distance: f32,
    max_distance: f32,
    min_level: u32,
    max_level: u32,
    edge_distance: EdgeDistance,
}

impl LodController {
    /// Create a controller, rejecting empty or inverted ranges.
    pub fn new(config: &LodConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            min_level: config.min_level,
            max_level: config.max_level,
            edge_distance: config.edge_distance,
        })
    }

    /// Coarsest factor this controller emits.
    pub fn min_level(&self) -> u32 {
        self.min_level
    }

    /// Finest factor this controller emits.
    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// `clamp((|z| - MIN_DISTANCE) / (MAX_DISTANCE - MIN_DISTANCE), 0, 1)`.
    ///
    /// NaN depth is treated as infinitely far.
    pub fn normalized_distance(&self, eye_z: f32) -> f32 {
        let d = (eye_z.abs() - self.min_distance) / (self.max_distance - self.min_distance);
        if d.is_nan() { 1.0 } else { d.clamp(0.0, 1.0) }
    }

    /// Integer level for a normalized distance: `MAX_LEVEL` at 0, `MIN_LEVEL` at 1.
    pub fn level_for_distance(&self, d: f32) -> u32 {
        let d = if d.is_nan() { 1.0 } else { d.clamp(0.0, 1.0) };
        let max = self.max_level as f32;
        let min = self.min_level as f32;
        let level = (max + (min - max) * d).round() as u32;
        level.clamp(self.min_level, self.max_level)
    }

    /// Factor for an edge whose endpoints have normalized distances `a` and `b`.
    pub fn edge_level(&self, a: f32, b: f32) -> u32 {
        let d = match self.edge_distance {
            EdgeDistance::Nearer => a.min(b),
            EdgeDistance::Farther => a.max(b),
        };
        self.level_for_distance(d)
    }

    /// Normalized distance of each corner of `patch`.
    pub fn corner_distances(&self, patch: &Patch, frame: &FrameContext) -> [f32; 4] {
        let model_view = frame.model_view();
        patch
            .corners
            .map(|corner| self.normalized_distance(model_view.transform_point3(corner).z))
    }

    /// Subdivision factors for one patch.
    pub fn patch_factors(&self, patch: &Patch, frame: &FrameContext) -> SubdivisionFactors {
        let distances = self.corner_distances(patch, frame);
        let outer = PatchEdge::ALL.map(|edge| {
            let (a, b) = edge.corners();
            self.edge_level(distances[a], distances[b])
        });
        SubdivisionFactors::from_outer(outer)
    }

    /// Factors for every patch in `grid`, in patch order.
    ///
    /// Patches are evaluated in parallel; results do not depend on scheduling.
    pub fn grid_factors(&self, grid: &PatchGrid, frame: &FrameContext) -> Vec<SubdivisionFactors> {
        let factors: Vec<SubdivisionFactors> = grid
            .patches()
            .par_iter()
            .map(|patch| self.patch_factors(patch, frame))
            .collect();
        tracing::trace!(patches = factors.len(), "computed subdivision factors");
        factors
    }
}

impl Default for LodController {
    fn default() -> Self {
        let config = LodConfig::default();
        Self {
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            min_level: config.min_level,
            max_level: config.max_level,
            edge_distance: config.edge_distance,
        }
    }
}
