//! CPU quad subdivision with integer spacing.
//!
//! Produces the same topology a fixed-function quad tessellator does: each
//! outer edge is split into exactly its own factor's segments, the interior
//! is a regular lattice, and a transition ring joins the two.
//!
//! ## Layout
//!
//! Points are emitted as the outer ring first, walked counter-clockwise in
//! `(u, v)` starting at `(0, 0)`:
//!
//! | Side   | Edge slot | Walk           |
//! |--------|-----------|----------------|
//! | v = 0  | 1         | u ascending    |
//! | u = 1  | 2         | v ascending    |
//! | v = 1  | 3         | u descending   |
//! | u = 0  | 0         | v descending   |
//!
//! followed by the interior lattice row by row. Edge points are computed as
//! `t / k` from integers only, so two patches sharing an edge with the same
//! factor produce bit-identical parameters along it.

use glam::Vec2;
use relief_lod::SubdivisionFactors;

/// Parametric points and triangle indices for one patch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TessellatedPatch {
    /// `(u, v)` in `[0, 1]²`.
    pub coords: Vec<Vec2>,
    /// Triangle list, counter-clockwise in `(u, v)`.
    pub indices: Vec<u32>,
}

impl TessellatedPatch {
    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as coordinate triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec2; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.coords[tri[0] as usize],
                self.coords[tri[1] as usize],
                self.coords[tri[2] as usize],
            ]
        })
    }
}

/// Twice the signed area of `abc`; positive when counter-clockwise.
fn signed_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

struct Builder {
    coords: Vec<Vec2>,
    indices: Vec<u32>,
}

impl Builder {
    fn point(&mut self, p: Vec2) -> u32 {
        self.coords.push(p);
        (self.coords.len() - 1) as u32
    }

    fn triangle(&mut self, a: u32, b: u32, c: u32) {
        let area = signed_area(
            self.coords[a as usize],
            self.coords[b as usize],
            self.coords[c as usize],
        );
        if area < 0.0 {
            self.indices.extend_from_slice(&[a, c, b]);
        } else {
            self.indices.extend_from_slice(&[a, b, c]);
        }
    }

    /// Triangulate the band between an outer polyline and the matching inner
    /// polyline. Both run in `dir`; whichever chain's next point comes first
    /// along `dir` advances (outer on ties).
    fn zipper(&mut self, outer: &[u32], inner: &[u32], dir: Vec2) {
        let along = |coords: &[Vec2], idx: u32| coords[idx as usize].dot(dir);
        let (mut o, mut i) = (0, 0);
        while o + 1 < outer.len() || i + 1 < inner.len() {
            let advance_outer = if o + 1 >= outer.len() {
                false
            } else if i + 1 >= inner.len() {
                true
            } else {
                along(&self.coords, outer[o + 1]) <= along(&self.coords, inner[i + 1])
            };
            if advance_outer {
                self.triangle(outer[o], outer[o + 1], inner[i]);
                o += 1;
            } else {
                self.triangle(outer[o], inner[i + 1], inner[i]);
                i += 1;
            }
        }
    }
}

/// Subdivide the unit quad according to `factors`.
///
/// Outer factors below 1 are treated as 1. Inner factors below 2 are raised
/// to 2 so the interior always holds at least one point.
pub fn tessellate_quad(factors: &SubdivisionFactors) -> TessellatedPatch {
    let k = factors.outer.map(|f| f.max(1));
    let n = factors.inner[0].max(2);
    let m = factors.inner[1].max(2);

    let ring_len: u32 = k.iter().sum();
    let mut b = Builder {
        coords: Vec::with_capacity((ring_len + (n - 1) * (m - 1)) as usize),
        indices: Vec::new(),
    };

    // Outer ring; slot order is the walk order above.
    let frac = |t: u32, k: u32| t as f32 / k as f32;
    let mut sides: [Vec<u32>; 4] = Default::default();
    for t in 0..k[1] {
        sides[1].push(b.point(Vec2::new(frac(t, k[1]), 0.0)));
    }
    for t in 0..k[2] {
        sides[2].push(b.point(Vec2::new(1.0, frac(t, k[2]))));
    }
    for t in 0..k[3] {
        sides[3].push(b.point(Vec2::new(frac(k[3] - t, k[3]), 1.0)));
    }
    for t in 0..k[0] {
        sides[0].push(b.point(Vec2::new(0.0, frac(k[0] - t, k[0]))));
    }
    // Close each side with the first point of the next one.
    let starts = [sides[1][0], sides[2][0], sides[3][0], sides[0][0]];
    sides[1].push(starts[1]);
    sides[2].push(starts[2]);
    sides[3].push(starts[3]);
    sides[0].push(starts[0]);

    // Interior lattice (i, j) for i in 1..n, j in 1..m.
    let base = b.coords.len() as u32;
    for j in 1..m {
        for i in 1..n {
            b.point(Vec2::new(frac(i, n), frac(j, m)));
        }
    }
    let lattice = |i: u32, j: u32| base + (j - 1) * (n - 1) + (i - 1);

    let inner_sides: [Vec<u32>; 4] = [
        (1..m).rev().map(|j| lattice(1, j)).collect(),
        (1..n).map(|i| lattice(i, 1)).collect(),
        (1..m).map(|j| lattice(n - 1, j)).collect(),
        (1..n).rev().map(|i| lattice(i, m - 1)).collect(),
    ];
    let directions = [Vec2::NEG_Y, Vec2::X, Vec2::Y, Vec2::NEG_X];

    for slot in [1, 2, 3, 0] {
        b.zipper(&sides[slot], &inner_sides[slot], directions[slot]);
    }

    for j in 1..m.saturating_sub(1) {
        for i in 1..n.saturating_sub(1) {
            let a = lattice(i, j);
            let r = lattice(i + 1, j);
            let u = lattice(i, j + 1);
            let d = lattice(i + 1, j + 1);
            b.triangle(a, r, d);
            b.triangle(a, d, u);
        }
    }

    TessellatedPatch {
        coords: b.coords,
        indices: b.indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(patch: &TessellatedPatch) -> f32 {
        patch
            .triangles()
            .map(|[a, b, c]| signed_area(a, b, c) / 2.0)
            .sum()
    }

    fn points_on(patch: &TessellatedPatch, on_edge: impl Fn(Vec2) -> bool) -> Vec<Vec2> {
        patch.coords.iter().copied().filter(|&p| on_edge(p)).collect()
    }

    #[test]
    fn test_uniform_factor_counts() {
        for k in [1, 2, 3, 4, 7, 16, 64] {
            let patch = tessellate_quad(&SubdivisionFactors::uniform(k));
            let lattice = k.max(2);
            // Inner levels of 1 are raised to 2, so k = 1 still gets a centre point.
            if k >= 2 {
                assert_eq!(patch.coords.len() as u32, (k + 1) * (k + 1), "k={k}");
                assert_eq!(patch.triangle_count() as u32, 2 * k * k, "k={k}");
            } else {
                assert_eq!(patch.coords.len() as u32, 4 + (lattice - 1) * (lattice - 1));
                assert_eq!(patch.triangle_count(), 4);
            }
        }
    }

    #[test]
    fn test_outer_edges_have_factor_plus_one_points() {
        let factors = SubdivisionFactors::from_outer([3, 10, 6, 4]);
        let patch = tessellate_quad(&factors);
        assert_eq!(points_on(&patch, |p| p.x == 0.0).len(), 4);
        assert_eq!(points_on(&patch, |p| p.y == 0.0).len(), 11);
        assert_eq!(points_on(&patch, |p| p.x == 1.0).len(), 7);
        assert_eq!(points_on(&patch, |p| p.y == 1.0).len(), 5);
    }

    #[test]
    fn test_triangles_are_counter_clockwise() {
        for outer in [[4, 4, 4, 4], [1, 64, 2, 33], [64, 4, 4, 4], [5, 9, 7, 3]] {
            let patch = tessellate_quad(&SubdivisionFactors::from_outer(outer));
            for tri in patch.triangles() {
                assert!(
                    signed_area(tri[0], tri[1], tri[2]) > 0.0,
                    "{outer:?}: {tri:?} not CCW"
                );
            }
        }
    }

    #[test]
    fn test_triangles_cover_unit_square() {
        for outer in [[1, 1, 1, 1], [2, 17, 5, 64], [64, 64, 4, 4], [9, 3, 9, 3]] {
            let patch = tessellate_quad(&SubdivisionFactors::from_outer(outer));
            let total = area(&patch);
            assert!((total - 1.0).abs() < 1e-4, "{outer:?}: area {total}");
        }
    }

    #[test]
    fn test_indices_in_range() {
        let patch = tessellate_quad(&SubdivisionFactors::from_outer([7, 2, 12, 5]));
        let n = patch.coords.len() as u32;
        assert!(patch.indices.iter().all(|&i| i < n));
        assert_eq!(patch.indices.len() % 3, 0);
    }

    #[test]
    fn test_shared_edge_parameters_match() {
        // Patch A's u = 1 edge meets patch B's u = 0 edge with the same factor.
        let a = tessellate_quad(&SubdivisionFactors::from_outer([4, 9, 13, 30]));
        let b = tessellate_quad(&SubdivisionFactors::from_outer([13, 2, 64, 5]));

        let mut right: Vec<f32> = points_on(&a, |p| p.x == 1.0).iter().map(|p| p.y).collect();
        let mut left: Vec<f32> = points_on(&b, |p| p.x == 0.0).iter().map(|p| p.y).collect();
        right.sort_by(f32::total_cmp);
        left.sort_by(f32::total_cmp);
        assert_eq!(right, left);

        // A's v = 1 edge against a third patch's v = 0 edge.
        let c = tessellate_quad(&SubdivisionFactors::from_outer([1, 30, 1, 1]));
        let mut top: Vec<f32> = points_on(&a, |p| p.y == 1.0).iter().map(|p| p.x).collect();
        let mut bottom: Vec<f32> = points_on(&c, |p| p.y == 0.0).iter().map(|p| p.x).collect();
        top.sort_by(f32::total_cmp);
        bottom.sort_by(f32::total_cmp);
        assert_eq!(top, bottom);
    }

    #[test]
    fn test_no_interior_point_on_boundary() {
        let patch = tessellate_quad(&SubdivisionFactors::from_outer([2, 3, 4, 5]));
        let boundary = patch
            .coords
            .iter()
            .filter(|p| p.x == 0.0 || p.x == 1.0 || p.y == 0.0 || p.y == 1.0)
            .count();
        assert_eq!(boundary, 2 + 3 + 4 + 5);
    }

    #[test]
    fn test_zero_factors_treated_as_one() {
        let patch = tessellate_quad(&SubdivisionFactors {
            outer: [0; 4],
            inner: [0; 2],
        });
        assert_eq!(patch.coords.len(), 5);
        assert!((area(&patch) - 1.0).abs() < 1e-6);
    }
}
