//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level renderer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Output surface settings.
    pub window: WindowConfig,
    /// Heightmap source and patch grid settings.
    pub terrain: TerrainConfig,
    /// Subdivision factor settings.
    pub lod: LodConfig,
    /// Height remap settings.
    pub displacement: DisplacementConfig,
    /// Fragment colouring settings.
    pub shading: ShadingConfig,
    /// Initial camera pose and projection.
    pub camera: CameraConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Output surface configuration. Only the aspect ratio reaches the core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
}

/// Which image channel carries the height samples.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum HeightChannel {
    /// First channel (red, or the only channel of a grayscale image).
    #[default]
    Red,
    /// Second channel.
    Green,
    /// Third channel.
    Blue,
    /// Rec. 709 luminance of the RGB channels, as `image` computes it for luma conversion.
    Luminance,
}

/// How the terrain surface is turned into geometry.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum,
)]
pub enum RenderMode {
    /// Coarse patches refined per frame by the LOD controller.
    #[default]
    Tessellated,
    /// One vertex per heightmap pixel with baked heights, drawn as triangle strips.
    Strip,
}

/// What to do when the heightmap cannot be loaded.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum LoadFailurePolicy {
    /// Abort startup with the load error.
    Abort,
    /// Log a warning and substitute a flat field.
    #[default]
    Flat,
}

/// Heightmap source and patch grid configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Path to the heightmap image.
    pub heightmap: PathBuf,
    /// Channel to read heights from.
    pub channel: HeightChannel,
    /// Flip the image vertically on load.
    pub flip_vertical: bool,
    /// Patches per axis in tessellated mode.
    pub rez: u32,
    /// Geometry mode.
    pub mode: RenderMode,
    /// Behaviour when the heightmap fails to load.
    pub on_load_failure: LoadFailurePolicy,
    /// Side length in samples of the substituted flat field.
    pub fallback_size: u32,
    /// Normalized height of the substituted flat field.
    pub fallback_level: f32,
}

/// Which endpoint distance governs an edge's subdivision factor.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum EdgeDistance {
    /// The nearer endpoint (smaller normalized distance) governs.
    #[default]
    Nearer,
    /// The farther endpoint (larger normalized distance) governs.
    Farther,
}

/// Distance-to-subdivision mapping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    /// Eye-space depth at or below which the maximum level is used.
    pub min_distance: f32,
    /// Eye-space depth at or beyond which the minimum level is used.
    pub max_distance: f32,
    /// Coarsest subdivision count.
    pub min_level: u32,
    /// Finest subdivision count.
    pub max_level: u32,
    /// Endpoint combination rule for edge factors.
    pub edge_distance: EdgeDistance,
}

/// Affine remap from a height sample to a world-space offset.
///
/// `height = sample * sample_range * scale - shift`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplacementConfig {
    /// Multiplier applied after expanding the sample.
    pub scale: f32,
    /// Offset subtracted last.
    pub shift: f32,
    /// Expansion of the normalized sample before scaling (1 or 255).
    pub sample_range: f32,
}

/// Shading function selector.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum,
)]
pub enum ShadingKind {
    /// Grayscale by height.
    HeightGrayscale,
    /// Grayscale blended with an environment sample below the water line.
    #[default]
    WaterBlend,
    /// A single constant colour.
    FlatColor,
}

/// Fragment colouring configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShadingConfig {
    /// Active shading function.
    pub model: ShadingKind,
    /// World height mapped to black.
    pub band_low: f32,
    /// World height mapped to white.
    pub band_high: f32,
    /// Normalized height where terrain starts to show through water.
    pub water_low: f32,
    /// Normalized height above which no water is blended.
    pub water_high: f32,
    /// Weight of the surface normal when bending the refraction ray.
    pub refraction_strength: f32,
    /// Colour used by [`ShadingKind::FlatColor`].
    pub flat_color: [f32; 3],
}

/// Initial camera state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// World-space eye position.
    pub position: [f32; 3],
    /// Heading in degrees (-90 looks down -Z).
    pub yaw: f32,
    /// Elevation in degrees, clamped to ±89.
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
    /// Units per second.
    pub movement_speed: f32,
    /// Degrees per pixel of mouse motion.
    pub mouse_sensitivity: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Draw patches as wireframe on hosts that support it.
    pub wireframe_mode: bool,
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 800,
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            heightmap: PathBuf::from("assets/heightmap.png"),
            channel: HeightChannel::Red,
            flip_vertical: false,
            rez: 20,
            mode: RenderMode::Tessellated,
            on_load_failure: LoadFailurePolicy::Flat,
            fallback_size: 256,
            fallback_level: 0.25,
        }
    }
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            min_distance: 20.0,
            max_distance: 800.0,
            min_level: 4,
            max_level: 64,
            edge_distance: EdgeDistance::Nearer,
        }
    }
}

impl Default for DisplacementConfig {
    fn default() -> Self {
        Self {
            scale: 64.0,
            shift: 16.0,
            sample_range: 1.0,
        }
    }
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            model: ShadingKind::WaterBlend,
            band_low: -16.0,
            band_high: 16.0,
            water_low: 0.15,
            water_high: 0.30,
            refraction_strength: 0.15,
            flat_color: [0.45, 0.55, 0.35],
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 120.0, 300.0],
            yaw: -90.0,
            pitch: -20.0,
            fov: 45.0,
            near: 0.1,
            far: 5000.0,
            movement_speed: 10.0,
            mouse_sensitivity: 0.1,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            wireframe_mode: false,
            log_level: "info".to_string(),
        }
    }
}

// --- Validation ---

fn require_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be finite, got {value}")))
    }
}

impl TerrainConfig {
    /// Largest accepted patch count per axis.
    pub const MAX_REZ: u32 = 4096;

    /// Reject parameters the patch grid or fallback field cannot be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rez == 0 {
            return Err(ConfigError::invalid("terrain.rez", "must be at least 1"));
        }
        if self.rez > Self::MAX_REZ {
            return Err(ConfigError::invalid(
                "terrain.rez",
                format!("must not exceed {}, got {}", Self::MAX_REZ, self.rez),
            ));
        }
        if self.fallback_size == 0 {
            return Err(ConfigError::invalid(
                "terrain.fallback_size",
                "must be at least 1",
            ));
        }
        require_finite("terrain.fallback_level", self.fallback_level)
    }
}

impl LodConfig {
    /// Reject level and distance ranges that cannot be interpolated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_level == 0 {
            return Err(ConfigError::invalid("lod.min_level", "must be at least 1"));
        }
        if self.min_level > self.max_level {
            return Err(ConfigError::invalid(
                "lod.min_level",
                format!(
                    "min_level ({}) exceeds max_level ({})",
                    self.min_level, self.max_level
                ),
            ));
        }
        require_finite("lod.min_distance", self.min_distance)?;
        require_finite("lod.max_distance", self.max_distance)?;
        if self.min_distance < 0.0 {
            return Err(ConfigError::invalid(
                "lod.min_distance",
                "must not be negative",
            ));
        }
        if self.min_distance >= self.max_distance {
            return Err(ConfigError::invalid(
                "lod.max_distance",
                format!(
                    "max_distance ({}) must exceed min_distance ({})",
                    self.max_distance, self.min_distance
                ),
            ));
        }
        Ok(())
    }
}

impl DisplacementConfig {
    /// Reject non-finite remap constants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_finite("displacement.scale", self.scale)?;
        require_finite("displacement.shift", self.shift)?;
        require_finite("displacement.sample_range", self.sample_range)?;
        if self.sample_range <= 0.0 {
            return Err(ConfigError::invalid(
                "displacement.sample_range",
                "must be positive",
            ));
        }
        Ok(())
    }
}

impl ShadingConfig {
    /// Reject empty height bands and inverted water thresholds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_finite("shading.band_low", self.band_low)?;
        require_finite("shading.band_high", self.band_high)?;
        if self.band_high <= self.band_low {
            return Err(ConfigError::invalid(
                "shading.band_high",
                "must exceed band_low",
            ));
        }
        if !(self.water_low < self.water_high) {
            return Err(ConfigError::invalid(
                "shading.water_high",
                "must exceed water_low",
            ));
        }
        Ok(())
    }
}

impl CameraConfig {
    /// Reject clip planes and fields of view that give a degenerate projection.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for value in self.position {
            require_finite("camera.position", value)?;
        }
        require_finite("camera.yaw", self.yaw)?;
        require_finite("camera.pitch", self.pitch)?;
        require_finite("camera.movement_speed", self.movement_speed)?;
        require_finite("camera.mouse_sensitivity", self.mouse_sensitivity)?;
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return Err(ConfigError::invalid(
                "camera.fov",
                format!("must lie strictly between 0 and 180 degrees, got {}", self.fov),
            ));
        }
        if !(self.near.is_finite() && self.near > 0.0) {
            return Err(ConfigError::invalid(
                "camera.near",
                format!("must be positive and finite, got {}", self.near),
            ));
        }
        if !(self.far.is_finite() && self.far > self.near) {
            return Err(ConfigError::invalid(
                "camera.far",
                format!("must be finite and exceed near ({}), got {}", self.near, self.far),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Validate every section that feeds a startup-time constructor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.terrain.validate()?;
        self.lod.validate()?;
        self.displacement.validate()?;
        self.shading.validate()?;
        self.camera.validate()?;
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::invalid(
                "window",
                "width and height must be non-zero",
            ));
        }
        Ok(())
    }

    /// Width divided by height of the output surface.
    pub fn aspect_ratio(&self) -> f32 {
        self.window.width as f32 / self.window.height.max(1) as f32
    }
}

// --- Load / Save ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// The platform config directory for Relief (e.g. `~/.config/relief`).
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("relief"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("rez: 20"));
        assert!(ron_str.contains("max_level: 64"));
        assert!(ron_str.contains("Tessellated"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.shading.model = ShadingKind::FlatColor;
        config.lod.edge_distance = EdgeDistance::Farther;
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(terrain: (rez: 8))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.terrain.rez, 8);
        assert_eq!(config.terrain.channel, HeightChannel::Red);
        assert_eq!(config.lod, LodConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_window_title_from_older_files_ignored() {
        let config: Config =
            ron::from_str(r#"(window: (width: 640, height: 480, title: "Relief"))"#).unwrap();
        assert_eq!(config.window.width, 640);
        assert!((config.aspect_ratio() - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_rez_rejected() {
        let mut config = Config::default();
        config.terrain.rez = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "terrain.rez",
                ..
            }
        ));
    }

    #[test]
    fn test_oversized_rez_rejected() {
        let mut config = Config::default();
        config.terrain.rez = TerrainConfig::MAX_REZ;
        assert!(config.validate().is_ok());
        config.terrain.rez = 65_536;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "terrain.rez",
                ..
            }
        ));
    }

    #[test]
    fn test_inverted_levels_rejected() {
        let lod = LodConfig {
            min_level: 65,
            ..LodConfig::default()
        };
        assert!(lod.validate().is_err());
    }

    #[test]
    fn test_equal_levels_accepted() {
        let lod = LodConfig {
            min_level: 16,
            max_level: 16,
            ..LodConfig::default()
        };
        assert!(lod.validate().is_ok());
    }

    #[test]
    fn test_zero_min_level_rejected() {
        let lod = LodConfig {
            min_level: 0,
            ..LodConfig::default()
        };
        assert!(lod.validate().is_err());
    }

    #[test]
    fn test_inverted_distances_rejected() {
        let lod = LodConfig {
            min_distance: 800.0,
            max_distance: 20.0,
            ..LodConfig::default()
        };
        assert!(lod.validate().is_err());

        let lod = LodConfig {
            max_distance: f32::NAN,
            ..LodConfig::default()
        };
        assert!(lod.validate().is_err());
    }

    #[test]
    fn test_non_positive_sample_range_rejected() {
        let displacement = DisplacementConfig {
            sample_range: 0.0,
            ..DisplacementConfig::default()
        };
        assert!(displacement.validate().is_err());
    }

    #[test]
    fn test_empty_shading_band_rejected() {
        let shading = ShadingConfig {
            band_low: 4.0,
            band_high: 4.0,
            ..ShadingConfig::default()
        };
        assert!(shading.validate().is_err());
    }

    fn camera_field(camera: CameraConfig) -> Option<&'static str> {
        match camera.validate() {
            Err(ConfigError::Invalid { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_degenerate_clip_planes_rejected() {
        let base = CameraConfig::default();
        let near_zero = CameraConfig {
            near: 0.0,
            ..base.clone()
        };
        assert_eq!(camera_field(near_zero), Some("camera.near"));
        let near_negative = CameraConfig {
            near: -1.0,
            ..base.clone()
        };
        assert_eq!(camera_field(near_negative), Some("camera.near"));
        let far_at_near = CameraConfig {
            far: base.near,
            ..base.clone()
        };
        assert_eq!(camera_field(far_at_near), Some("camera.far"));
        let far_infinite = CameraConfig {
            far: f32::INFINITY,
            ..base
        };
        assert_eq!(camera_field(far_infinite), Some("camera.far"));
    }

    #[test]
    fn test_field_of_view_bounds() {
        for fov in [0.0, -45.0, 180.0, 270.0, f32::NAN] {
            let camera = CameraConfig {
                fov,
                ..CameraConfig::default()
            };
            assert_eq!(camera_field(camera), Some("camera.fov"), "fov {fov}");
        }
        let narrow = CameraConfig {
            fov: 1.0,
            ..CameraConfig::default()
        };
        assert!(narrow.validate().is_ok());
    }

    #[test]
    fn test_camera_checked_by_config_validate() {
        let mut config = Config::default();
        config.camera.far = 0.05;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "camera.far",
                ..
            }
        ));
        config.camera = CameraConfig {
            yaw: f32::NAN,
            ..CameraConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_aspect_ratio() {
        let config = Config::default();
        assert!((config.aspect_ratio() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.terrain.rez = 32;
        config.terrain.heightmap = PathBuf::from("maps/iceland.png");
        config.displacement.scale = 0.25;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }
}
