//! Command-line argument parsing for Relief.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, RenderMode, ShadingKind};

/// Relief command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "relief", about = "View-adaptive heightmap terrain")]
pub struct CliArgs {
    /// Heightmap image to render.
    #[arg(long)]
    pub heightmap: Option<PathBuf>,

    /// Patches per axis in tessellated mode.
    #[arg(long)]
    pub rez: Option<u32>,

    /// Geometry mode.
    #[arg(long, value_enum)]
    pub mode: Option<RenderMode>,

    /// Shading function.
    #[arg(long, value_enum)]
    pub shading: Option<ShadingKind>,

    /// Coarsest subdivision level.
    #[arg(long)]
    pub min_level: Option<u32>,

    /// Finest subdivision level.
    #[arg(long)]
    pub max_level: Option<u32>,

    /// Surface width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Surface height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Number of frames to render before exiting.
    #[arg(long, default_value_t = 120)]
    pub frames: u32,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref path) = args.heightmap {
            self.terrain.heightmap = path.clone();
        }
        if let Some(rez) = args.rez {
            self.terrain.rez = rez;
        }
        if let Some(mode) = args.mode {
            self.terrain.mode = mode;
        }
        if let Some(shading) = args.shading {
            self.shading.model = shading;
        }
        if let Some(level) = args.min_level {
            self.lod.min_level = level;
        }
        if let Some(level) = args.max_level {
            self.lod.max_level = level;
        }
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            rez: Some(8),
            mode: Some(RenderMode::Strip),
            heightmap: Some(PathBuf::from("iceland.png")),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.terrain.rez, 8);
        assert_eq!(config.terrain.mode, RenderMode::Strip);
        assert_eq!(config.terrain.heightmap, PathBuf::from("iceland.png"));
        // Non-overridden fields retain defaults
        assert_eq!(config.lod.max_level, 64);
        assert_eq!(config.window.width, 1600);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_value_enums() {
        let args = CliArgs::parse_from([
            "relief",
            "--mode",
            "strip",
            "--shading",
            "height-grayscale",
            "--frames",
            "3",
        ]);
        assert_eq!(args.mode, Some(RenderMode::Strip));
        assert_eq!(args.shading, Some(ShadingKind::HeightGrayscale));
        assert_eq!(args.frames, 3);
    }
}
