//! # Scalar and Color Grids
//!
//! Row-major 2D buffers shared by every stage of the pipeline.
//!
//! - [`HeightField`]: scalar heights, conceptually in [0, 1]
//! - [`ColorGrid`]: 24-bit RGB pixels produced from a height field
//!
//! Both are plain owned values. Whoever produces a grid owns it until it is
//! handed to a tile or dropped.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::error::{ProceduralError, ProceduralResult};

/// 24-bit RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
#[repr(C)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Pure black.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Creates a color from its channels.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packs the color as `0x00RRGGBB`.
    #[inline]
    #[must_use]
    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Unpacks a `0x00RRGGBB` value. The top byte is ignored.
    #[inline]
    #[must_use]
    pub const fn from_u32(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xFF) as u8,
            g: ((packed >> 8) & 0xFF) as u8,
            b: (packed & 0xFF) as u8,
        }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(color: Rgb) -> Self {
        [color.r, color.g, color.b]
    }
}

fn check_dimensions(width: usize, height: usize) -> ProceduralResult<usize> {
    match width.checked_mul(height) {
        Some(len) if len > 0 => Ok(len),
        _ => Err(ProceduralError::InvalidDimensions { width, height }),
    }
}

/// A 2D grid of scalar heights.
///
/// Values are conceptually in [0, 1] but may transiently leave that range
/// while a generator is still accumulating. Call [`HeightField::clamp_unit`]
/// before handing the field on.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl HeightField {
    /// Creates a zero-filled field.
    ///
    /// # Errors
    ///
    /// Returns [`ProceduralError::InvalidDimensions`] if either side is zero.
    pub fn new(width: usize, height: usize) -> ProceduralResult<Self> {
        Self::filled(width, height, 0.0)
    }

    /// Creates a field with every cell set to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`ProceduralError::InvalidDimensions`] if either side is zero.
    pub fn filled(width: usize, height: usize, value: f32) -> ProceduralResult<Self> {
        let len = check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            values: vec![value; len],
        })
    }

    /// Wraps existing row-major values.
    ///
    /// # Errors
    ///
    /// Returns [`ProceduralError::InvalidDimensions`] if a side is zero or
    /// `values` does not hold exactly `width * height` entries.
    pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> ProceduralResult<Self> {
        let len = check_dimensions(width, height)?;
        if values.len() != len {
            return Err(ProceduralError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// Builds a field from `sample(x, y)`. Callers guarantee non-zero sides.
    pub(crate) fn from_fn(width: usize, height: usize, mut sample: impl FnMut(usize, usize) -> f32) -> Self {
        let mut values = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                values.push(sample(x, y));
            }
        }
        Self {
            width,
            height,
            values,
        }
    }

    /// Width in samples.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in samples.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Whether the field is N×N.
    #[inline]
    #[must_use]
    pub const fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Sample at `(x, y)`, or `None` outside the field.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.values[y * self.width + x])
        } else {
            None
        }
    }

    /// Writes a sample. Out-of-range writes are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        if x < self.width && y < self.height {
            self.values[y * self.width + x] = value;
        }
    }

    /// One row of samples.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[must_use]
    pub fn row(&self, y: usize) -> &[f32] {
        let start = y * self.width;
        &self.values[start..start + self.width]
    }

    /// All samples in row-major order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Smallest and largest sample.
    #[must_use]
    pub fn min_max(&self) -> (f32, f32) {
        self.values
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Clamps every sample into [0, 1]. NaN becomes 0.
    pub fn clamp_unit(&mut self) {
        for v in &mut self.values {
            *v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        }
    }

    /// Maps every sample to a color, keeping the shape.
    #[must_use]
    pub fn map_colors(&self, mut color: impl FnMut(f32) -> Rgb) -> ColorGrid {
        ColorGrid {
            width: self.width,
            height: self.height,
            pixels: self.values.iter().map(|&v| color(v)).collect(),
        }
    }

    /// Rescales samples so the smallest becomes 0 and the largest 1.
    ///
    /// A flat field becomes all zeros.
    pub fn normalize(&mut self) {
        let (lo, hi) = self.min_max();
        let span = hi - lo;
        if span <= f32::EPSILON {
            self.values.fill(0.0);
            return;
        }
        for v in &mut self.values {
            *v = (*v - lo) / span;
        }
    }
}

/// A 2D grid of RGB pixels, the same shape as its source height field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorGrid {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl ColorGrid {
    /// Wraps existing row-major pixels.
    ///
    /// # Errors
    ///
    /// Returns [`ProceduralError::InvalidDimensions`] if a side is zero or
    /// the pixel count does not match.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Rgb>) -> ProceduralResult<Self> {
        let len = check_dimensions(width, height)?;
        if pixels.len() != len {
            return Err(ProceduralError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Pixel at `(x, y)`, or `None` outside the grid.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// All pixels in row-major order.
    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Raw `RGBRGB...` bytes, ready for upload.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Pixels packed as `0x00RRGGBB`, the layout most blitters expect.
    #[must_use]
    pub fn to_argb(&self) -> Vec<u32> {
        self.pixels.iter().map(|p| p.to_u32()).collect()
    }
}
