//! Full-resolution terrain mesh for targets without runtime subdivision.
//!
//! One vertex per height field sample with the height baked in, and one
//! triangle strip per pair of adjacent rows. Trades adaptivity for zero
//! per-frame geometry work.

use glam::{Vec2, Vec3};

use crate::heightfield::HeightField;
use crate::remap::HeightRemap;

/// A baked terrain vertex.
///
/// Layout (32 bytes): position `[f32; 3]`, normal `[f32; 3]`, tex_coord `[f32; 2]`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StripVertex {
    /// Model-space position with height applied.
    pub position: [f32; 3],
    /// Surface normal from central differences.
    pub normal: [f32; 3],
    /// Height field texture coordinate at the texel centre.
    pub tex_coord: [f32; 2],
}

static_assertions::assert_eq_size!(StripVertex, [u8; 32]);

/// Row-strip mesh over the whole height field.
#[derive(Clone, Debug)]
pub struct StripMesh {
    vertices: Vec<StripVertex>,
    indices: Vec<u32>,
    columns: u32,
    rows: u32,
}

impl StripMesh {
    /// Walk `field` at native resolution, baking heights through `remap`.
    ///
    /// Vertex `(row, col)` sits at `x = col - width/2`, `z = row - height/2`.
    pub fn build(field: &HeightField, remap: &HeightRemap) -> Self {
        let columns = field.width();
        let rows = field.height();
        let half = Vec2::new(columns as f32, rows as f32) / 2.0;
        let height_at = |row: i64, col: i64| {
            let row = row.clamp(0, rows as i64 - 1) as u32;
            let col = col.clamp(0, columns as i64 - 1) as u32;
            remap.apply(field.get(row, col))
        };

        let mut vertices = Vec::with_capacity(columns as usize * rows as usize);
        for row in 0..rows {
            for col in 0..columns {
                let (r, c) = (row as i64, col as i64);
                let y = height_at(r, c);
                let dx = height_at(r, c - 1) - height_at(r, c + 1);
                let dz = height_at(r - 1, c) - height_at(r + 1, c);
                let normal = Vec3::new(dx, 2.0, dz).normalize_or(Vec3::Y);
                vertices.push(StripVertex {
                    position: [col as f32 - half.x, y, row as f32 - half.y],
                    normal: normal.to_array(),
                    tex_coord: [
                        (col as f32 + 0.5) / columns as f32,
                        (row as f32 + 0.5) / rows as f32,
                    ],
                });
            }
        }

        let strips = rows.saturating_sub(1);
        let mut indices = Vec::with_capacity(strips as usize * columns as usize * 2);
        for row in 0..strips {
            for col in 0..columns {
                for k in 0..2 {
                    indices.push(col + columns * (row + k));
                }
            }
        }

        tracing::info!(
            vertices = vertices.len(),
            strips,
            triangles = strips as usize * (2 * columns as usize).saturating_sub(2),
            "built strip mesh"
        );

        Self {
            vertices,
            indices,
            columns,
            rows,
        }
    }

    /// All baked vertices, row-major.
    pub fn vertices(&self) -> &[StripVertex] {
        &self.vertices
    }

    /// Concatenated strip indices.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of strips (`rows - 1`).
    pub fn strip_count(&self) -> u32 {
        self.rows.saturating_sub(1)
    }

    /// Indices per strip (`2 * columns`).
    pub fn vertices_per_strip(&self) -> u32 {
        self.columns * 2
    }

    /// Index slice of strip `s`, or `None` if out of range.
    pub fn strip_indices(&self, s: u32) -> Option<&[u32]> {
        if s >= self.strip_count() {
            return None;
        }
        let n = self.vertices_per_strip() as usize;
        let start = s as usize * n;
        self.indices.get(start..start + n)
    }

    /// Total triangles drawn across all strips.
    pub fn triangle_count(&self) -> usize {
        self.strip_count() as usize * (self.vertices_per_strip() as usize).saturating_sub(2)
    }

    /// Expand the strips into a counter-clockwise triangle list (viewed from +Y).
    pub fn triangle_list(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.triangle_count() * 3);
        for s in 0..self.strip_count() {
            let Some(strip) = self.strip_indices(s) else {
                continue;
            };
            for (k, tri) in strip.windows(3).enumerate() {
                // Strip winding alternates every triangle.
                if k % 2 == 0 {
                    out.extend_from_slice(&[tri[0], tri[1], tri[2]]);
                } else {
                    out.extend_from_slice(&[tri[1], tri[0], tri[2]]);
                }
            }
        }
        out
    }
}
