//! Canonical `wgpu::VertexBufferLayout`s for terrain rendering.
//!
//! A host renderer references these layouts instead of restating offsets, so
//! the buffers built here and the pipelines built there cannot drift apart.
//!
//! ## Control points (patch input, 20 bytes)
//!
//! | Location | Offset | Format    | Field     |
//! |----------|--------|-----------|-----------|
//! | 0        | 0      | Float32x3 | position  |
//! | 1        | 12     | Float32x2 | tex_coord |
//!
//! ## Strip vertices (32 bytes)
//!
//! | Location | Offset | Format    | Field     |
//! |----------|--------|-----------|-----------|
//! | 0        | 0      | Float32x3 | position  |
//! | 1        | 12     | Float32x3 | normal    |
//! | 2        | 24     | Float32x2 | tex_coord |
//!
//! ## Terrain vertices (displaced and shaded, 48 bytes)
//!
//! | Location | Offset | Format    | Field     |
//! |----------|--------|-----------|-----------|
//! | 0        | 0      | Float32x3 | position  |
//! | 1        | 12     | Float32x3 | normal    |
//! | 2        | 24     | Float32x2 | tex_coord |
//! | 3        | 32     | Float32x4 | color     |

use std::mem;

use glam::Vec4;
use relief_terrain::{ControlPoint, StripVertex};
use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

use crate::displacement::DisplacedPoint;

/// A displaced, shaded vertex as handed to a render target.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// World-space normal.
    pub normal: [f32; 3],
    /// Height field texture coordinate.
    pub tex_coord: [f32; 2],
    /// Linear RGBA.
    pub color: [f32; 4],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 48]);

impl TerrainVertex {
    /// Pack a displaced point with its shaded colour.
    pub fn new(point: &DisplacedPoint, color: Vec4) -> Self {
        Self {
            position: point.world.to_array(),
            normal: point.world_normal.to_array(),
            tex_coord: point.tex_coord.to_array(),
            color: color.to_array(),
        }
    }
}

pub const CONTROL_POINT_ATTRIBUTES: [VertexAttribute; 2] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: 12,
        shader_location: 1,
    },
];

/// Layout of the flat `rez² × 4` control point buffer.
pub const CONTROL_POINT_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<ControlPoint>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &CONTROL_POINT_ATTRIBUTES,
};

pub const STRIP_VERTEX_ATTRIBUTES: [VertexAttribute; 3] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 12,
        shader_location: 1,
    },
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: 24,
        shader_location: 2,
    },
];

/// Layout of the baked strip mesh.
pub const STRIP_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<StripVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &STRIP_VERTEX_ATTRIBUTES,
};

pub const TERRAIN_VERTEX_ATTRIBUTES: [VertexAttribute; 4] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 12,
        shader_location: 1,
    },
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: 24,
        shader_location: 2,
    },
    VertexAttribute {
        format: VertexFormat::Float32x4,
        offset: 32,
        shader_location: 3,
    },
];

/// Layout of per-frame displaced vertices.
pub const TERRAIN_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<TerrainVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &TERRAIN_VERTEX_ATTRIBUTES,
};

// ---------------------------------------------------------------------------
// Compile-time validation
// ---------------------------------------------------------------------------

const _: () = assert!(mem::size_of::<ControlPoint>() == 20);
const _: () = assert!(mem::size_of::<StripVertex>() == 32);
const _: () = assert!(mem::size_of::<TerrainVertex>() == 48);

/// Last attribute of each layout must fit within its stride.
const _: () = assert!(CONTROL_POINT_ATTRIBUTES[1].offset + 8 <= mem::size_of::<ControlPoint>() as u64);
const _: () = assert!(STRIP_VERTEX_ATTRIBUTES[2].offset + 8 <= mem::size_of::<StripVertex>() as u64);
const _: () =
    assert!(TERRAIN_VERTEX_ATTRIBUTES[3].offset + 16 <= mem::size_of::<TerrainVertex>() as u64);
