//! Headless terrain flight over a heightmap.
//!
//! Loads `config.ron` (created with defaults on first run), applies CLI
//! overrides, then flies a scripted camera over the terrain and logs the
//! geometry produced each frame.
//!
//! Run with `cargo run -p relief-demo -- --heightmap assets/heightmap.png`.
//! Run with `cargo run -p relief-demo -- --mode strip --frames 10` for the
//! full-resolution mesh.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use glam::{Mat4, Vec2, Vec3};
use relief_config::{CliArgs, Config};
use relief_render::{Camera, CameraMovement, FrameStats, TerrainPipeline};
use tracing::{debug, error, info};

/// Simulated frame time for the scripted flight.
const FRAME_DT: f32 = 1.0 / 60.0;

/// Where the scripted camera sits at `frame` of `frames`.
///
/// The first half circles the terrain centre while descending; the second
/// half dollies forward from wherever the orbit ended.
fn orbit_eye(frame: u32, frames: u32, extent: Vec2) -> Vec3 {
    let t = frame as f32 / frames.max(1) as f32;
    let radius = extent.max_element() * 0.75;
    let angle = t * std::f32::consts::TAU;
    let altitude = radius * (0.6 - 0.4 * t);
    Vec3::new(radius * angle.cos(), altitude, radius * angle.sin())
}

#[derive(Default)]
struct FlightTotals {
    frames: u32,
    triangles: usize,
    peak_triangles: usize,
    min_factor: Option<u32>,
    max_factor: Option<u32>,
}

impl FlightTotals {
    fn record(&mut self, stats: &FrameStats) {
        self.frames += 1;
        self.triangles += stats.triangles;
        self.peak_triangles = self.peak_triangles.max(stats.triangles);
        self.min_factor = match (self.min_factor, stats.min_factor) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max_factor = match (self.max_factor, stats.max_factor) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }

    fn mean_triangles(&self) -> usize {
        self.triangles / self.frames.max(1) as usize
    }
}

fn fly(pipeline: &TerrainPipeline, config: &Config, frames: u32) -> FlightTotals {
    let field = pipeline.height_field();
    let extent = Vec2::new(field.width() as f32, field.height() as f32);
    let mut camera = Camera::from_config(&config.camera, config.aspect_ratio());
    let orbit_frames = frames / 2;
    let mut totals = FlightTotals::default();

    for frame in 0..frames {
        if frame < orbit_frames {
            camera.position = orbit_eye(frame, orbit_frames, extent);
            camera.look_at(Vec3::ZERO);
        } else {
            camera.process_keyboard(CameraMovement::Forward, FRAME_DT);
            camera.process_mouse(4.0, 0.0, true);
        }

        let ctx = camera.frame_context(Mat4::IDENTITY);
        let output = pipeline.render_frame(&ctx);
        if pipeline.wireframe() {
            let lines: usize = output
                .patches
                .iter()
                .map(|p| p.wireframe_indices().len() / 2)
                .sum();
            debug!(frame, lines, "wireframe");
        }
        info!(
            frame,
            eye = ?camera.position,
            patches = output.stats.patches,
            vertices = output.stats.vertices,
            triangles = output.stats.triangles,
            "frame"
        );
        totals.record(&output.stats);
    }
    totals
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args
        .config
        .clone()
        .or_else(Config::default_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    relief_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = config.validate() {
        error!("invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    info!(
        heightmap = %config.terrain.heightmap.display(),
        rez = config.terrain.rez,
        mode = ?config.terrain.mode,
        frames = args.frames,
        "starting flight"
    );

    let pipeline = match TerrainPipeline::from_config(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let started = Instant::now();
    let totals = fly(&pipeline, &config, args.frames);
    let elapsed = started.elapsed();

    info!(
        frames = totals.frames,
        mean_triangles = totals.mean_triangles(),
        peak_triangles = totals.peak_triangles,
        min_factor = ?totals.min_factor,
        max_factor = ?totals.max_factor,
        elapsed_ms = elapsed.as_millis() as u64,
        "flight complete"
    );
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_config::RenderMode;
    use relief_render::Geometry;

    #[test]
    fn test_orbit_starts_above_terrain_and_descends() {
        let extent = Vec2::new(256.0, 256.0);
        let first = orbit_eye(0, 60, extent);
        let last = orbit_eye(59, 60, extent);
        assert!(first.y > last.y);
        assert!(last.y > 0.0);
        let radius = Vec2::new(first.x, first.z).length();
        assert!((radius - 192.0).abs() < 1e-3);
    }

    #[test]
    fn test_orbit_handles_zero_frames() {
        let eye = orbit_eye(0, 0, Vec2::splat(10.0));
        assert!(eye.is_finite());
    }

    #[test]
    fn test_totals_merge_factors() {
        let mut totals = FlightTotals::default();
        totals.record(&FrameStats {
            patches: 1,
            vertices: 9,
            triangles: 8,
            min_factor: Some(4),
            max_factor: Some(10),
        });
        totals.record(&FrameStats {
            patches: 1,
            vertices: 25,
            triangles: 32,
            min_factor: Some(6),
            max_factor: Some(40),
        });
        assert_eq!(totals.mean_triangles(), 20);
        assert_eq!(totals.peak_triangles, 32);
        assert_eq!(totals.min_factor, Some(4));
        assert_eq!(totals.max_factor, Some(40));
    }

    #[test]
    fn test_short_flight_on_fallback_terrain() {
        let mut config = Config::default();
        config.terrain.heightmap = PathBuf::from("does/not/exist.png");
        config.terrain.rez = 2;
        config.terrain.fallback_size = 16;
        let pipeline = TerrainPipeline::from_config(&config).unwrap();
        assert!(matches!(pipeline.geometry(), Geometry::Tessellated { .. }));
        let totals = fly(&pipeline, &config, 4);
        assert_eq!(totals.frames, 4);
        assert!(totals.peak_triangles > 0);
    }

    #[test]
    fn test_short_flight_strip_mode() {
        let mut config = Config::default();
        config.terrain.heightmap = PathBuf::from("does/not/exist.png");
        config.terrain.mode = RenderMode::Strip;
        config.terrain.fallback_size = 8;
        let pipeline = TerrainPipeline::from_config(&config).unwrap();
        let totals = fly(&pipeline, &config, 2);
        assert_eq!(totals.min_factor, None);
        assert_eq!(totals.peak_triangles, 7 * 14);
    }
}
