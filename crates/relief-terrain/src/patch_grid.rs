//! Coarse quad-patch lattice over the terrain extent.
//!
//! The grid is `rez × rez` patches centred on the origin, each carrying four
//! control points at `y = 0` plus texture coordinates into the height field.
//! Corner coordinates are computed from a shared lattice formula, so two
//! patches that meet along an edge agree on its endpoints bit for bit.
//!
//! ## Corner and edge order
//!
//! Corners follow the quad parametric domain `(u, v)`:
//!
//! | Index | Name  | `(u, v)` |
//! |-------|-------|----------|
//! | 0     | `p00` | (0, 0)   |
//! | 1     | `p01` | (1, 0)   |
//! | 2     | `p10` | (0, 1)   |
//! | 3     | `p11` | (1, 1)   |
//!
//! Edges walk the perimeter `p10 → p00 → p01 → p11 → p10`; see [`PatchEdge`].

use glam::{Vec2, Vec3};
use relief_config::{ConfigError, TerrainConfig};

use crate::heightfield::HeightField;

/// One side of a patch. Discriminants are the outer subdivision factor slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PatchEdge {
    /// `u = 0` (minimum x), corners `p10`, `p00`.
    MinX = 0,
    /// `v = 0` (minimum z), corners `p00`, `p01`.
    MinZ = 1,
    /// `u = 1` (maximum x), corners `p01`, `p11`.
    MaxX = 2,
    /// `v = 1` (maximum z), corners `p11`, `p10`.
    MaxZ = 3,
}

impl PatchEdge {
    /// All edges in factor-slot order.
    pub const ALL: [PatchEdge; 4] = [
        PatchEdge::MinX,
        PatchEdge::MinZ,
        PatchEdge::MaxX,
        PatchEdge::MaxZ,
    ];

    /// Corner indices of the edge's two endpoints.
    pub const fn corners(self) -> (usize, usize) {
        match self {
            PatchEdge::MinX => (2, 0),
            PatchEdge::MinZ => (0, 1),
            PatchEdge::MaxX => (1, 3),
            PatchEdge::MaxZ => (3, 2),
        }
    }

    /// The edge a neighbouring patch shares with this one.
    pub const fn opposite(self) -> PatchEdge {
        match self {
            PatchEdge::MinX => PatchEdge::MaxX,
            PatchEdge::MinZ => PatchEdge::MaxZ,
            PatchEdge::MaxX => PatchEdge::MinX,
            PatchEdge::MaxZ => PatchEdge::MinZ,
        }
    }
}

/// A quad of four control points with matching texture coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Patch {
    /// Model-space corners in `p00, p01, p10, p11` order.
    pub corners: [Vec3; 4],
    /// Texture coordinates in the same order, in `[0, 1]`.
    pub tex_coords: [Vec2; 4],
}

impl Patch {
    /// Endpoints of `edge`.
    pub fn edge(&self, edge: PatchEdge) -> (Vec3, Vec3) {
        let (a, b) = edge.corners();
        (self.corners[a], self.corners[b])
    }

    /// Axis-aligned footprint `(min, max)` on the XZ plane.
    pub fn footprint(&self) -> (Vec2, Vec2) {
        let min = self.corners[0].min(self.corners[3]);
        let max = self.corners[0].max(self.corners[3]);
        (Vec2::new(min.x, min.z), Vec2::new(max.x, max.z))
    }

    /// Mean of the four corners.
    pub fn center(&self) -> Vec3 {
        self.corners.iter().copied().sum::<Vec3>() / 4.0
    }
}

/// Interleaved control point as uploaded to a patch vertex buffer.
///
/// Layout (20 bytes): position `[f32; 3]`, tex_coord `[f32; 2]`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ControlPoint {
    /// Model-space position.
    pub position: [f32; 3],
    /// Height field texture coordinate.
    pub tex_coord: [f32; 2],
}

static_assertions::assert_eq_size!(ControlPoint, [u8; 20]);

/// Immutable `rez × rez` patch lattice.
#[derive(Clone, Debug)]
pub struct PatchGrid {
    rez: u32,
    extent: Vec2,
    patches: Vec<Patch>,
}

/// Lattice coordinate `k` of `rez` along an axis of length `extent`.
#[inline]
fn lattice(extent: f32, k: u32, rez: u32) -> f32 {
    -extent / 2.0 + extent * k as f32 / rez as f32
}

impl PatchGrid {
    /// Build `rez × rez` patches spanning `[-width/2, width/2] × [-depth/2, depth/2]`.
    pub fn build(rez: u32, width: f32, depth: f32) -> Result<Self, ConfigError> {
        if rez == 0 {
            return Err(ConfigError::invalid("terrain.rez", "must be at least 1"));
        }
        if rez > TerrainConfig::MAX_REZ {
            return Err(ConfigError::invalid(
                "terrain.rez",
                format!("must not exceed {}, got {rez}", TerrainConfig::MAX_REZ),
            ));
        }
        for (field, value) in [("terrain.width", width), ("terrain.depth", depth)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::invalid(
                    field,
                    format!("extent must be positive and finite, got {value}"),
                ));
            }
        }

        let r = rez as f32;
        let mut patches = Vec::with_capacity(rez as usize * rez as usize);
        for i in 0..rez {
            for j in 0..rez {
                let x0 = lattice(width, i, rez);
                let x1 = lattice(width, i + 1, rez);
                let z0 = lattice(depth, j, rez);
                let z1 = lattice(depth, j + 1, rez);
                let u0 = i as f32 / r;
                let u1 = (i + 1) as f32 / r;
                let v0 = j as f32 / r;
                let v1 = (j + 1) as f32 / r;
                patches.push(Patch {
                    corners: [
                        Vec3::new(x0, 0.0, z0),
                        Vec3::new(x1, 0.0, z0),
                        Vec3::new(x0, 0.0, z1),
                        Vec3::new(x1, 0.0, z1),
                    ],
                    tex_coords: [
                        Vec2::new(u0, v0),
                        Vec2::new(u1, v0),
                        Vec2::new(u0, v1),
                        Vec2::new(u1, v1),
                    ],
                });
            }
        }

        tracing::info!(
            rez,
            patches = patches.len(),
            control_points = patches.len() * 4,
            "built patch grid"
        );

        Ok(Self {
            rez,
            extent: Vec2::new(width, depth),
            patches,
        })
    }

    /// Build a grid whose extent equals the field's pixel dimensions.
    pub fn for_height_field(rez: u32, field: &HeightField) -> Result<Self, ConfigError> {
        Self::build(rez, field.width() as f32, field.height() as f32)
    }

    /// Patches per axis.
    pub fn rez(&self) -> u32 {
        self.rez
    }

    /// World-space `(width, depth)`.
    pub fn extent(&self) -> Vec2 {
        self.extent
    }

    /// Total patch count (`rez²`).
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// Always `false`; a grid has at least one patch.
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// All patches, column `i` major then row `j`.
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Flat index of patch `(i, j)`.
    pub fn index(&self, i: u32, j: u32) -> usize {
        i as usize * self.rez as usize + j as usize
    }

    /// Patch at column `i`, row `j`, if in range.
    pub fn patch(&self, i: u32, j: u32) -> Option<&Patch> {
        if i < self.rez && j < self.rez {
            self.patches.get(self.index(i, j))
        } else {
            None
        }
    }

    /// Coordinates of the patch across `edge`, if any.
    pub fn neighbor(&self, i: u32, j: u32, edge: PatchEdge) -> Option<(u32, u32)> {
        let (ni, nj) = match edge {
            PatchEdge::MinX => (i.checked_sub(1)?, j),
            PatchEdge::MaxX => (i + 1, j),
            PatchEdge::MinZ => (i, j.checked_sub(1)?),
            PatchEdge::MaxZ => (i, j + 1),
        };
        (ni < self.rez && nj < self.rez).then_some((ni, nj))
    }

    /// Control points as raw bytes for a vertex buffer upload.
    pub fn control_point_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.control_points()).to_vec()
    }

    /// The flat `rez² × 4` control point sequence.
    pub fn control_points(&self) -> Vec<ControlPoint> {
        self.patches
            .iter()
            .flat_map(|patch| {
                (0..4).map(move |k| ControlPoint {
                    position: patch.corners[k].to_array(),
                    tex_coord: patch.tex_coords[k].to_array(),
                })
            })
            .collect()
    }
}
