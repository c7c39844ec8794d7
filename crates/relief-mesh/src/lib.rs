//! Patch subdivision, height displacement, and GPU vertex formats.

pub mod displacement;
pub mod tessellation;
pub mod vertex_format;

pub use displacement::{DisplacedPoint, DisplacementStage, PatchFrame};
pub use tessellation::{TessellatedPatch, tessellate_quad};
pub use vertex_format::{
    CONTROL_POINT_ATTRIBUTES, CONTROL_POINT_LAYOUT, STRIP_VERTEX_ATTRIBUTES, STRIP_VERTEX_LAYOUT,
    TERRAIN_VERTEX_ATTRIBUTES, TERRAIN_VERTEX_LAYOUT, TerrainVertex,
};
