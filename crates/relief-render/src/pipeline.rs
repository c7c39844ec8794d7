//! Frame orchestration: LOD, subdivision, displacement, shading.
//!
//! The height field and patch grid are built once at startup and never
//! mutated. Each call to [`TerrainPipeline::render_frame`] reads a
//! [`FrameContext`] snapshot and produces fresh per-patch geometry; nothing
//! carries over between frames.

use std::sync::Arc;

use glam::Vec3;
use rayon::prelude::*;
use relief_config::{Config, ConfigError, LoadFailurePolicy, RenderMode, TerrainConfig};
use relief_lod::{FrameContext, LodController, SubdivisionFactors};
use relief_mesh::{DisplacementStage, PatchFrame, TerrainVertex, tessellate_quad};
use relief_terrain::{HeightField, HeightSampler, LoadError, PatchGrid, StripMesh};

use crate::shading::{EnvironmentSampler, ShadingModel, SkyGradient};

/// Errors that prevent a pipeline from being built.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to load heightmap: {0}")]
    Load(#[from] LoadError),
}

/// Static geometry source, fixed at construction.
#[derive(Debug, Clone)]
pub enum Geometry {
    /// Coarse patches refined each frame.
    Tessellated {
        grid: PatchGrid,
        lod: LodController,
    },
    /// Full-resolution baked mesh; no per-frame LOD.
    Strip { mesh: StripMesh },
}

/// Geometry for one patch (or the whole strip mesh) in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchSubmission {
    /// Factors the patch was subdivided with; `None` in strip mode.
    pub factors: Option<SubdivisionFactors>,
    /// Displaced, shaded vertices.
    pub vertices: Vec<TerrainVertex>,
    /// Triangle list into `vertices`.
    pub indices: Vec<u32>,
}

impl PatchSubmission {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Line list covering every triangle edge, for wireframe hosts.
    ///
    /// Interior edges appear once per adjacent triangle.
    pub fn wireframe_indices(&self) -> Vec<u32> {
        self.indices
            .chunks_exact(3)
            .flat_map(|t| [t[0], t[1], t[1], t[2], t[2], t[0]])
            .collect()
    }
}

/// Summary of one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub patches: usize,
    pub vertices: usize,
    pub triangles: usize,
    /// Smallest subdivision factor used, if any patch was subdivided.
    pub min_factor: Option<u32>,
    /// Largest subdivision factor used, if any patch was subdivided.
    pub max_factor: Option<u32>,
}

impl FrameStats {
    fn collect(submissions: &[PatchSubmission]) -> Self {
        let factors = submissions.iter().filter_map(|s| s.factors);
        Self {
            patches: submissions.len(),
            vertices: submissions.iter().map(|s| s.vertices.len()).sum(),
            triangles: submissions.iter().map(PatchSubmission::triangle_count).sum(),
            min_factor: factors.clone().map(|f| f.min_level()).min(),
            max_factor: factors.map(|f| f.max_level()).max(),
        }
    }
}

/// Everything produced for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub patches: Vec<PatchSubmission>,
    pub stats: FrameStats,
}

/// Load the configured heightmap, applying the load failure policy.
pub fn load_height_field(config: &TerrainConfig) -> Result<HeightField, PipelineError> {
    let sampler = HeightSampler::from_config(config);
    match sampler.load(&config.heightmap) {
        Ok(field) => Ok(field),
        Err(err) => match config.on_load_failure {
            LoadFailurePolicy::Abort => Err(err.into()),
            LoadFailurePolicy::Flat => {
                tracing::warn!(
                    error = %err,
                    size = config.fallback_size,
                    level = config.fallback_level,
                    "heightmap unavailable, substituting flat terrain"
                );
                Ok(HeightField::flat(
                    config.fallback_size,
                    config.fallback_size,
                    config.fallback_level,
                ))
            }
        },
    }
}

/// The terrain renderer, minus the GPU.
pub struct TerrainPipeline {
    field: HeightField,
    geometry: Geometry,
    displacement: DisplacementStage,
    shading: ShadingModel,
    environment: Arc<dyn EnvironmentSampler>,
    wireframe: bool,
}

impl TerrainPipeline {
    /// Load the heightmap named by `config` and build the pipeline.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        config.validate()?;
        let field = load_height_field(&config.terrain)?;
        Self::new(config, field)
    }

    /// Build the pipeline over an already loaded height field.
    pub fn new(config: &Config, field: HeightField) -> Result<Self, PipelineError> {
        let displacement = DisplacementStage::from_config(&config.displacement)?;
        let shading = ShadingModel::from_config(&config.shading)?;
        let geometry = match config.terrain.mode {
            RenderMode::Tessellated => Geometry::Tessellated {
                grid: PatchGrid::for_height_field(config.terrain.rez, &field)?,
                lod: LodController::new(&config.lod)?,
            },
            RenderMode::Strip => Geometry::Strip {
                mesh: StripMesh::build(&field, displacement.remap()),
            },
        };

        tracing::info!(
            width = field.width(),
            height = field.height(),
            mode = ?config.terrain.mode,
            shading = ?config.shading.model,
            "terrain pipeline ready"
        );

        Ok(Self {
            field,
            geometry,
            displacement,
            shading,
            environment: Arc::new(SkyGradient::default()),
            wireframe: config.debug.wireframe_mode,
        })
    }

    /// Replace the environment used by water shading.
    pub fn with_environment(mut self, environment: Arc<dyn EnvironmentSampler>) -> Self {
        self.environment = environment;
        self
    }

    pub fn height_field(&self) -> &HeightField {
        &self.field
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn shading(&self) -> &ShadingModel {
        &self.shading
    }

    /// Whether the host should draw [`PatchSubmission::wireframe_indices`].
    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    /// Produce this frame's geometry from `ctx`.
    pub fn render_frame(&self, ctx: &FrameContext) -> FrameOutput {
        let patches = match &self.geometry {
            Geometry::Tessellated { grid, lod } => self.render_patches(grid, lod, ctx),
            Geometry::Strip { mesh } => vec![self.render_strip(mesh, ctx)],
        };
        let stats = FrameStats::collect(&patches);
        tracing::debug!(
            patches = stats.patches,
            vertices = stats.vertices,
            triangles = stats.triangles,
            min_factor = ?stats.min_factor,
            max_factor = ?stats.max_factor,
            "frame rendered"
        );
        FrameOutput { patches, stats }
    }

    fn render_patches(
        &self,
        grid: &PatchGrid,
        lod: &LodController,
        ctx: &FrameContext,
    ) -> Vec<PatchSubmission> {
        let factors = lod.grid_factors(grid, ctx);
        grid.patches()
            .par_iter()
            .zip(factors.par_iter())
            .map(|(patch, factors)| {
                let tessellated = tessellate_quad(factors);
                let frame = PatchFrame::new(patch);
                let vertices = self
                    .displacement
                    .evaluate_patch(&self.field, &frame, &tessellated, ctx)
                    .iter()
                    .map(|point| {
                        let color = self.shading.shade(
                            point.height,
                            point.world_normal,
                            self.environment.as_ref(),
                        );
                        TerrainVertex::new(point, color)
                    })
                    .collect();
                PatchSubmission {
                    factors: Some(*factors),
                    vertices,
                    indices: tessellated.indices,
                }
            })
            .collect()
    }

    fn render_strip(&self, mesh: &StripMesh, ctx: &FrameContext) -> PatchSubmission {
        let normal_matrix = ctx.normal_matrix();
        let vertices = mesh
            .vertices()
            .par_iter()
            .map(|v| {
                let position = Vec3::from_array(v.position);
                let normal = (normal_matrix * Vec3::from_array(v.normal)).normalize_or(Vec3::Y);
                // Base surface is y = 0, so the baked y is the height offset.
                let color = self
                    .shading
                    .shade(position.y, normal, self.environment.as_ref());
                TerrainVertex {
                    position: ctx.model.transform_point3(position).to_array(),
                    normal: normal.to_array(),
                    tex_coord: v.tex_coord,
                    color: color.to_array(),
                }
            })
            .collect();
        PatchSubmission {
            factors: None,
            vertices,
            indices: mesh.triangle_list(),
        }
    }
}
