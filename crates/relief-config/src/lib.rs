//! Configuration system for the Relief terrain renderer.
//!
//! Provides the settings for every stage of the terrain pipeline (heightmap
//! decoding, patch grid, LOD, displacement, shading, camera) persisted to disk
//! as RON. Supports CLI overrides via clap and construction-time validation
//! of nonsensical parameters.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CameraConfig, Config, DebugConfig, DisplacementConfig, EdgeDistance, HeightChannel,
    LoadFailurePolicy, LodConfig, RenderMode, ShadingConfig, ShadingKind, TerrainConfig,
    WindowConfig,
};
pub use error::ConfigError;
