//! Static terrain data: heightmap decoding, the coarse patch grid, and the
//! per-pixel strip mesh used when no runtime subdivision is available.

mod heightfield;
mod patch_grid;
mod remap;
mod strip_mesh;

pub use heightfield::{HeightField, HeightSampler, LoadError};
pub use patch_grid::{ControlPoint, Patch, PatchEdge, PatchGrid};
pub use remap::HeightRemap;
pub use strip_mesh::{StripMesh, StripVertex};
