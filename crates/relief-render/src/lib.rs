//! Terrain frame pipeline: camera, shading, and per-frame geometry.

pub mod camera;
pub mod pipeline;
pub mod shading;

pub use camera::{Camera, CameraMovement};
pub use pipeline::{
    FrameOutput, FrameStats, Geometry, PatchSubmission, PipelineError, TerrainPipeline,
    load_height_field,
};
pub use shading::{CLEAR_COLOR, EnvironmentSampler, HeightBand, ShadingModel, SkyGradient, smoothstep};
