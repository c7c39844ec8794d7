//! Heightmap decoding into an immutable field of normalized samples.
//!
//! [`HeightSampler`] decodes an image to 8 bits per channel, picks one channel,
//! and normalizes it to `[0, 1]`. The resulting [`HeightField`] has exactly the
//! image's dimensions and is never modified afterwards; every sampling method
//! is a total function that clamps out-of-range input.

use std::path::{Path, PathBuf};

use glam::Vec2;
use image::DynamicImage;
use relief_config::{HeightChannel, TerrainConfig};

/// Errors produced while turning an image file into a [`HeightField`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("failed to open heightmap {}: {source}", .path.display())]
    Open {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not a decodable image.
    #[error("failed to decode heightmap {}: {source}", .path.display())]
    Decode {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying decoder failure.
        #[source]
        source: image::ImageError,
    },

    /// The image decoded to zero pixels.
    #[error("heightmap {} has no pixels", .path.display())]
    Empty {
        /// Path that was requested.
        path: PathBuf,
    },

    /// Raw samples do not match the requested dimensions.
    #[error("expected {expected} samples for the field, got {actual}")]
    SampleCount {
        /// `width * height`.
        expected: usize,
        /// Length of the provided buffer.
        actual: usize,
    },
}

impl LoadError {
    fn from_image(path: &Path, source: image::ImageError) -> Self {
        match source {
            image::ImageError::IoError(source) => Self::Open {
                path: path.to_path_buf(),
                source,
            },
            source => Self::Decode {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

/// Immutable 2D grid of normalized height samples, indexed `[row][col]`.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    width: u32,
    height: u32,
    samples: Vec<f32>,
}

/// Map NaN to 0 and clamp into `[0, 1]`.
fn unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl HeightField {
    /// Build a field from row-major samples. Samples are clamped into `[0, 1]`.
    pub fn from_samples(width: u32, height: u32, samples: Vec<f32>) -> Result<Self, LoadError> {
        let expected = width as usize * height as usize;
        if expected == 0 || samples.len() != expected {
            return Err(LoadError::SampleCount {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples: samples.into_iter().map(unit).collect(),
        })
    }

    /// A constant field, used when no heightmap backs the terrain.
    ///
    /// Zero dimensions are raised to 1 so the field is always sampleable.
    pub fn flat(width: u32, height: u32, value: f32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            samples: vec![unit(value); width as usize * height as usize],
        }
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major sample storage.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample at `(row, col)`, with indices clamped to the edge.
    pub fn get(&self, row: u32, col: u32) -> f32 {
        let row = row.min(self.height - 1) as usize;
        let col = col.min(self.width - 1) as usize;
        self.samples[row * self.width as usize + col]
    }

    /// Smallest and largest sample.
    pub fn min_max(&self) -> (f32, f32) {
        self.samples
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &s| (lo.min(s), hi.max(s)))
    }

    /// Nearest-texel lookup at texture coordinate `uv` (clamped to `[0, 1]²`).
    pub fn sample_nearest(&self, uv: Vec2) -> f32 {
        let col = (unit(uv.x) * self.width as f32) as u32;
        let row = (unit(uv.y) * self.height as f32) as u32;
        self.get(row, col)
    }

    /// Bilinear lookup at texture coordinate `uv` with clamp-to-edge addressing.
    ///
    /// Texel centers sit at `(col + 0.5) / width`, matching GPU texture filtering.
    pub fn sample_bilinear(&self, uv: Vec2) -> f32 {
        let (col0, col1, tx) = Self::axis(unit(uv.x), self.width);
        let (row0, row1, ty) = Self::axis(unit(uv.y), self.height);

        let h00 = self.get(row0, col0);
        let h01 = self.get(row0, col1);
        let h10 = self.get(row1, col0);
        let h11 = self.get(row1, col1);

        // a + (b - a) * t keeps constant neighbourhoods exact
        let top = h00 + (h01 - h00) * tx;
        let bottom = h10 + (h11 - h10) * tx;
        top + (bottom - top) * ty
    }

    /// Lower texel, upper texel and blend weight along one axis.
    fn axis(t: f32, size: u32) -> (u32, u32, f32) {
        let max = (size - 1) as f32;
        let x = (t * size as f32 - 0.5).clamp(0.0, max);
        let i0 = x.floor() as u32;
        let i1 = (i0 + 1).min(size - 1);
        (i0, i1, x - i0 as f32)
    }
}

/// Decodes heightmap images into [`HeightField`]s.
#[derive(Clone, Debug, Default)]
pub struct HeightSampler {
    channel: HeightChannel,
    flip_vertical: bool,
}

impl HeightSampler {
    /// Create a sampler reading `channel`.
    pub fn new(channel: HeightChannel, flip_vertical: bool) -> Self {
        Self {
            channel,
            flip_vertical,
        }
    }

    /// Create a sampler from the terrain section of the config.
    pub fn from_config(config: &TerrainConfig) -> Self {
        Self::new(config.channel, config.flip_vertical)
    }

    /// Open and decode the image at `path`.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<HeightField, LoadError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| LoadError::from_image(path, e))?;
        let field = self.decode(path, image)?;
        tracing::info!(
            path = %path.display(),
            width = field.width(),
            height = field.height(),
            channel = ?self.channel,
            "loaded heightmap"
        );
        Ok(field)
    }

    /// Convert an already decoded image. `origin` is only used in errors.
    pub fn decode(&self, origin: &Path, image: DynamicImage) -> Result<HeightField, LoadError> {
        let image = if self.flip_vertical {
            image.flipv()
        } else {
            image
        };
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(LoadError::Empty {
                path: origin.to_path_buf(),
            });
        }

        let samples: Vec<f32> = match self.channel {
            HeightChannel::Luminance => image
                .to_luma8()
                .pixels()
                .map(|p| p.0[0] as f32 / 255.0)
                .collect(),
            channel => {
                let index = match channel {
                    HeightChannel::Green => 1,
                    HeightChannel::Blue => 2,
                    _ => 0,
                };
                image
                    .to_rgb8()
                    .pixels()
                    .map(|p| p.0[index] as f32 / 255.0)
                    .collect()
            }
        };
        // The decoded image buffer is dropped here; only the samples survive.
        HeightField::from_samples(width, height, samples)
    }
}
