//! Height displacement of subdivided patch points.
//!
//! A parametric point `(u, v)` is mapped to the patch by bilinear
//! interpolation of its corners, lifted along the patch normal by the remapped
//! height sample, and projected with the frame's transforms.

use glam::{Vec2, Vec3, Vec4};
use rayon::prelude::*;
use relief_config::{ConfigError, DisplacementConfig};
use relief_lod::FrameContext;
use relief_terrain::{HeightField, HeightRemap, Patch};

use crate::tessellation::TessellatedPatch;

/// Bilinear weights for `p00, p01, p10, p11`.
///
/// Written as products of exact `0`/`1` factors at the patch border, so a
/// point on a shared edge depends only on that edge's two corners.
#[inline]
fn bilinear_weights(uv: Vec2) -> [f32; 4] {
    let (u, v) = (uv.x, uv.y);
    [(1.0 - u) * (1.0 - v), u * (1.0 - v), (1.0 - u) * v, u * v]
}

/// Corner data of one patch, resolved once per patch per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatchFrame {
    corners: [Vec3; 4],
    tex_coords: [Vec2; 4],
    normal: Vec3,
}

impl PatchFrame {
    /// Cache corners and compute `normalize(cross(p10 - p00, p01 - p00))`.
    ///
    /// Degenerate patches fall back to `+Y`.
    pub fn new(patch: &Patch) -> Self {
        let [p00, p01, p10, _] = patch.corners;
        let normal = (p10 - p00).cross(p01 - p00).normalize_or(Vec3::Y);
        Self {
            corners: patch.corners,
            tex_coords: patch.tex_coords,
            normal,
        }
    }

    /// Face normal.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Undisplaced model-space position at `uv`.
    pub fn position(&self, uv: Vec2) -> Vec3 {
        let w = bilinear_weights(uv);
        let c = &self.corners;
        c[0] * w[0] + c[1] * w[1] + c[2] * w[2] + c[3] * w[3]
    }

    /// Height field texture coordinate at `uv`.
    pub fn tex_coord(&self, uv: Vec2) -> Vec2 {
        let w = bilinear_weights(uv);
        let t = &self.tex_coords;
        t[0] * w[0] + t[1] * w[1] + t[2] * w[2] + t[3] * w[3]
    }
}

/// One displaced point, ready for shading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplacedPoint {
    /// Model-space position after displacement.
    pub position: Vec3,
    /// `model * position`.
    pub world: Vec3,
    /// `projection * view * world`.
    pub clip: Vec4,
    /// Height field texture coordinate.
    pub tex_coord: Vec2,
    /// Remapped height offset applied along the normal.
    pub height: f32,
    /// Patch normal in model space.
    pub normal: Vec3,
    /// Patch normal carried through the model's normal matrix.
    pub world_normal: Vec3,
}

/// Evaluates subdivided points against a height field.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DisplacementStage {
    remap: HeightRemap,
}

impl DisplacementStage {
    pub fn new(remap: HeightRemap) -> Self {
        Self { remap }
    }

    /// Build from the displacement config section.
    pub fn from_config(config: &DisplacementConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(HeightRemap::from_config(config)?))
    }

    pub fn remap(&self) -> &HeightRemap {
        &self.remap
    }

    /// Displace the point at `uv` of `frame`.
    pub fn evaluate(
        &self,
        field: &HeightField,
        frame: &PatchFrame,
        uv: Vec2,
        ctx: &FrameContext,
    ) -> DisplacedPoint {
        let tex_coord = frame.tex_coord(uv);
        let height = self.remap.apply(field.sample_bilinear(tex_coord));
        let normal = frame.normal();
        let position = frame.position(uv) + normal * height;
        let world = ctx.model.transform_point3(position);
        let clip = ctx.view_projection() * world.extend(1.0);
        DisplacedPoint {
            position,
            world,
            clip,
            tex_coord,
            height,
            normal,
            world_normal: ctx.world_normal(normal),
        }
    }

    /// Displace every point of `tessellated`, in point order.
    pub fn evaluate_patch(
        &self,
        field: &HeightField,
        frame: &PatchFrame,
        tessellated: &TessellatedPatch,
        ctx: &FrameContext,
    ) -> Vec<DisplacedPoint> {
        tessellated
            .coords
            .par_iter()
            .map(|&uv| self.evaluate(field, frame, uv, ctx))
            .collect()
    }
}
