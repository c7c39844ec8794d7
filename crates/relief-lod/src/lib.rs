//! View-dependent level of detail: per-patch subdivision factors from
//! eye-space corner distances.

mod controller;
mod frame;

pub use controller::{LodController, SubdivisionFactors};
pub use frame::FrameContext;
