//! Per-vertex colour from height and normal.

use glam::{Vec3, Vec4};
use relief_config::{ConfigError, ShadingConfig, ShadingKind};

/// Background colour of the output surface.
pub const CLEAR_COLOR: Vec3 = Vec3::new(0.70, 0.81, 1.0);

/// Direction-indexed environment lookup (a cube map on GPU hosts).
pub trait EnvironmentSampler: Send + Sync {
    /// Linear RGB seen along the unit direction `dir`.
    fn sample(&self, dir: Vec3) -> Vec3;
}

/// Three-stop vertical gradient: nadir, horizon, zenith.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyGradient {
    pub zenith: Vec3,
    pub horizon: Vec3,
    pub nadir: Vec3,
}

impl SkyGradient {
    /// The same colour in every direction.
    pub fn uniform(color: Vec3) -> Self {
        Self {
            zenith: color,
            horizon: color,
            nadir: color,
        }
    }
}

impl Default for SkyGradient {
    fn default() -> Self {
        Self {
            zenith: Vec3::new(0.42, 0.60, 0.95),
            horizon: CLEAR_COLOR,
            nadir: Vec3::new(0.12, 0.27, 0.40),
        }
    }
}

impl EnvironmentSampler for SkyGradient {
    fn sample(&self, dir: Vec3) -> Vec3 {
        let y = dir.y.clamp(-1.0, 1.0);
        if y >= 0.0 {
            self.horizon.lerp(self.zenith, y)
        } else {
            self.horizon.lerp(self.nadir, -y)
        }
    }
}

/// Hermite interpolation between `edge0` and `edge1`, clamped to `[0, 1]`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// World height range mapped onto `[0, 1]` brightness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightBand {
    pub low: f32,
    pub high: f32,
}

impl HeightBand {
    /// `clamp((height - low) / (high - low), 0, 1)`.
    pub fn normalize(&self, height: f32) -> f32 {
        ((height - self.low) / (self.high - self.low)).clamp(0.0, 1.0)
    }
}

/// Shading function applied to each displaced vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShadingModel {
    /// Gray level by normalized height.
    HeightGrayscale { band: HeightBand },
    /// Gray terrain fading into a refracted environment sample in low areas.
    WaterBlend {
        band: HeightBand,
        water_low: f32,
        water_high: f32,
        refraction_strength: f32,
    },
    /// Constant colour.
    FlatColor { color: Vec3 },
}

impl ShadingModel {
    /// Build the configured model, rejecting empty bands.
    pub fn from_config(config: &ShadingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let band = HeightBand {
            low: config.band_low,
            high: config.band_high,
        };
        Ok(match config.model {
            ShadingKind::HeightGrayscale => ShadingModel::HeightGrayscale { band },
            ShadingKind::WaterBlend => ShadingModel::WaterBlend {
                band,
                water_low: config.water_low,
                water_high: config.water_high,
                refraction_strength: config.refraction_strength,
            },
            ShadingKind::FlatColor => ShadingModel::FlatColor {
                color: Vec3::from_array(config.flat_color),
            },
        })
    }

    /// Opaque RGBA for a vertex at `height` with surface `normal`.
    pub fn shade(&self, height: f32, normal: Vec3, environment: &dyn EnvironmentSampler) -> Vec4 {
        let rgb = match *self {
            ShadingModel::HeightGrayscale { band } => Vec3::splat(band.normalize(height)),
            ShadingModel::WaterBlend {
                band,
                water_low,
                water_high,
                refraction_strength,
            } => {
                let h = band.normalize(height);
                let terrain = Vec3::splat(h);
                let mask = smoothstep(water_low, water_high, h);
                let n = normal.normalize_or(Vec3::Y);
                let refract_dir = (Vec3::NEG_Y + n * refraction_strength).normalize_or(Vec3::NEG_Y);
                let water = environment.sample(refract_dir);
                water.lerp(terrain, mask)
            }
            ShadingModel::FlatColor { color } => color,
        };
        rgb.extend(1.0)
    }
}

impl Default for ShadingModel {
    fn default() -> Self {
        let config = ShadingConfig::default();
        ShadingModel::WaterBlend {
            band: HeightBand {
                low: config.band_low,
                high: config.band_high,
            },
            water_low: config.water_low,
            water_high: config.water_high,
            refraction_strength: config.refraction_strength,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    struct Solid(Vec3);

    impl EnvironmentSampler for Solid {
        fn sample(&self, _dir: Vec3) -> Vec3 {
            self.0
        }
    }

    /// Echoes the lookup direction back as colour.
    struct DirectionAsColor;

    impl EnvironmentSampler for DirectionAsColor {
        fn sample(&self, dir: Vec3) -> Vec3 {
            dir
        }
    }

    fn model(kind: ShadingKind) -> ShadingModel {
        ShadingModel::from_config(&ShadingConfig {
            model: kind,
            ..ShadingConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.15, 0.30, 0.0), 0.0);
        assert_eq!(smoothstep(0.15, 0.30, 0.15), 0.0);
        assert_eq!(smoothstep(0.15, 0.30, 0.30), 1.0);
        assert_eq!(smoothstep(0.15, 0.30, 0.9), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_grayscale_band() {
        let shading = model(ShadingKind::HeightGrayscale);
        let env = SkyGradient::default();
        assert_eq!(shading.shade(-16.0, Vec3::Y, &env), Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(shading.shade(16.0, Vec3::Y, &env), Vec4::ONE);
        assert_eq!(shading.shade(0.0, Vec3::Y, &env), Vec4::new(0.5, 0.5, 0.5, 1.0));
        assert_eq!(shading.shade(400.0, Vec3::Y, &env), Vec4::ONE);
    }

    #[test]
    fn test_water_blend_below_water_line_is_environment() {
        let shading = model(ShadingKind::WaterBlend);
        let water = Vec3::new(0.1, 0.2, 0.9);
        // h = 0 -> mask 0 -> pure environment.
        let c = shading.shade(-16.0, Vec3::Y, &Solid(water));
        assert!((c.truncate() - water).length() < EPSILON);
    }

    #[test]
    fn test_water_blend_above_water_line_is_terrain() {
        let shading = model(ShadingKind::WaterBlend);
        // h = 0.5 -> mask 1 -> pure gray.
        let c = shading.shade(0.0, Vec3::Y, &Solid(Vec3::new(0.0, 0.0, 1.0)));
        assert!((c - Vec4::new(0.5, 0.5, 0.5, 1.0)).length() < EPSILON);
    }

    #[test]
    fn test_water_blend_is_partial_inside_band() {
        let shading = model(ShadingKind::WaterBlend);
        // h = 0.225, halfway between the water thresholds.
        let height = 0.225 * 32.0 - 16.0;
        let c = shading.shade(height, Vec3::Y, &Solid(Vec3::ZERO));
        assert!((c.x - 0.225 * 0.5).abs() < 1e-4, "got {c:?}");
    }

    #[test]
    fn test_refraction_direction_bends_toward_normal() {
        let shading = model(ShadingKind::WaterBlend);
        let normal = Vec3::X;
        let c = shading.shade(-16.0, normal, &DirectionAsColor);
        let expected = (Vec3::NEG_Y + normal * 0.15).normalize();
        assert!((c.truncate() - expected).length() < EPSILON);
    }

    #[test]
    fn test_flat_color() {
        let shading = model(ShadingKind::FlatColor);
        let c = shading.shade(3.0, Vec3::Y, &SkyGradient::default());
        assert_eq!(c, Vec4::new(0.45, 0.55, 0.35, 1.0));
    }

    #[test]
    fn test_inverted_band_rejected() {
        let config = ShadingConfig {
            band_low: 10.0,
            band_high: -10.0,
            ..ShadingConfig::default()
        };
        assert!(ShadingModel::from_config(&config).is_err());
    }

    #[test]
    fn test_sky_gradient_stops() {
        let sky = SkyGradient::default();
        assert!((sky.sample(Vec3::Y) - sky.zenith).length() < EPSILON);
        assert_eq!(sky.sample(Vec3::X), CLEAR_COLOR);
        assert!((sky.sample(Vec3::NEG_Y) - sky.nadir).length() < EPSILON);
        let flat = SkyGradient::uniform(CLEAR_COLOR);
        assert_eq!(flat.sample(Vec3::new(0.3, -0.2, 0.9)), CLEAR_COLOR);
    }

    #[test]
    fn test_default_matches_config_default() {
        assert_eq!(ShadingModel::default(), model(ShadingKind::WaterBlend));
    }
}
