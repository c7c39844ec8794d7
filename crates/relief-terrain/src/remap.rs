//! Affine remap from height samples to world-space offsets.

use relief_config::{ConfigError, DisplacementConfig};

/// `height = sample * sample_range * scale - shift`.
///
/// `sample_range` expands a normalized sample back into the domain the
/// constants were authored for: 1 for normalized texture reads, 255 for raw
/// 8-bit pixel values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightRemap {
    /// Multiplier applied after expanding the sample.
    pub scale: f32,
    /// Offset subtracted last.
    pub shift: f32,
    /// Expansion of the normalized sample before scaling.
    pub sample_range: f32,
}

impl HeightRemap {
    /// Constants for normalized texture samples: `[0, 1] -> [-16, 48]`.
    pub const NORMALIZED: Self = Self {
        scale: 64.0,
        shift: 16.0,
        sample_range: 1.0,
    };

    /// Constants for raw 8-bit samples: `[0, 255] -> [-16, ~47.75]`.
    pub const BYTE: Self = Self {
        scale: 64.0 / 256.0,
        shift: 16.0,
        sample_range: 255.0,
    };

    /// Build from the displacement section of the config.
    pub fn from_config(config: &DisplacementConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            scale: config.scale,
            shift: config.shift,
            sample_range: config.sample_range,
        })
    }

    /// World-space height offset for a normalized sample.
    #[inline]
    pub fn apply(&self, sample: f32) -> f32 {
        sample * self.sample_range * self.scale - self.shift
    }

    /// Offsets produced by samples 0 and 1, in ascending order.
    pub fn output_range(&self) -> (f32, f32) {
        let a = self.apply(0.0);
        let b = self.apply(1.0);
        (a.min(b), a.max(b))
    }
}

impl Default for HeightRemap {
    fn default() -> Self {
        Self::NORMALIZED
    }
}
