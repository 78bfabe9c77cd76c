//! # Gradient Palette
//!
//! Maps a height in [0, 1] to a color through a 256-entry lookup table.
//!
//! The table is built from color stops and band widths: band `i` linearly
//! interpolates from stop `i` to stop `i + 1` over `widths[i]` entries (the
//! last band holds the final stop). Whatever is left of the 256 entries is
//! filled with the final stop's color.
//!
//! A gradient is an ordinary value. Build one per configuration; nothing is
//! shared behind the caller's back.

use crate::error::{ProceduralError, ProceduralResult};
use crate::grid::{ColorGrid, HeightField, Rgb};

/// Number of resolved entries in every gradient.
pub const GRADIENT_SIZE: usize = 256;

/// A resolved 256-entry color table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gradient {
    table: Box<[Rgb; GRADIENT_SIZE]>,
}

impl Gradient {
    /// Resolves `stops` and `widths` into a full table.
    ///
    /// # Errors
    ///
    /// - [`ProceduralError::EmptyGradient`] if there are no stops
    /// - [`ProceduralError::GradientLengthMismatch`] if the lists differ in length
    pub fn new(stops: &[Rgb], widths: &[usize]) -> ProceduralResult<Self> {
        if stops.len() != widths.len() {
            return Err(ProceduralError::GradientLengthMismatch {
                stops: stops.len(),
                widths: widths.len(),
            });
        }
        if stops.is_empty() {
            return Err(ProceduralError::EmptyGradient);
        }
        Ok(Self {
            table: resolve(stops, widths),
        })
    }

    /// The classic overworld ramp: deep water, shallows, sand, grass,
    /// forest, rock, snow.
    #[must_use]
    pub fn terrain() -> Self {
        let (stops, widths) = terrain_stops();
        Self {
            table: resolve(&stops, &widths),
        }
    }

    /// Color for `height`, clamped into [0, 1] first. NaN reads as 0.
    #[inline]
    #[must_use]
    pub fn color_at(&self, height: f32) -> Rgb {
        self.table[bucket(height)]
    }

    /// All 256 entries.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[Rgb] {
        self.table.as_slice()
    }

    /// Converts a height field into a color grid of the same shape.
    #[must_use]
    pub fn colorize(&self, field: &HeightField) -> ColorGrid {
        field.map_colors(|h| self.color_at(h))
    }
}

/// Stops and widths behind [`Gradient::terrain`].
#[must_use]
pub fn terrain_stops() -> (Vec<Rgb>, Vec<usize>) {
    (
        vec![
            Rgb::new(0, 0, 90),
            Rgb::new(20, 80, 200),
            Rgb::new(230, 215, 140),
            Rgb::new(70, 160, 50),
            Rgb::new(20, 90, 30),
            Rgb::new(120, 110, 100),
            Rgb::new(250, 250, 250),
        ],
        vec![80, 30, 15, 50, 40, 30, 11],
    )
}

/// Fills the table band by band. `stops` must be non-empty.
fn resolve(stops: &[Rgb], widths: &[usize]) -> Box<[Rgb; GRADIENT_SIZE]> {
    let last = stops.last().copied().unwrap_or(Rgb::BLACK);
    let mut table = Box::new([last; GRADIENT_SIZE]);
    let mut filled = 0;

    'bands: for (i, (&from, &width)) in stops.iter().zip(widths).enumerate() {
        let to = stops.get(i + 1).copied().unwrap_or(from);
        for step in 0..width {
            if filled == GRADIENT_SIZE {
                break 'bands;
            }
            let t = step as f32 / width as f32;
            table[filled] = lerp(from, to, t);
            filled += 1;
        }
    }
    table
}

/// Table index for a height: `floor(h * 255)` clamped to [0, 255].
#[inline]
fn bucket(height: f32) -> usize {
    if height.is_nan() {
        return 0;
    }
    let index = (height.clamp(0.0, 1.0) * 255.0).floor() as usize;
    index.min(GRADIENT_SIZE - 1)
}

/// Channel-wise lerp, truncating toward zero.
#[inline]
fn lerp(from: Rgb, to: Rgb, t: f32) -> Rgb {
    let channel = |a: u8, b: u8| {
        let value = f32::from(a) + (f32::from(b) - f32::from(a)) * t;
        value.clamp(0.0, 255.0) as u8
    };
    Rgb::new(channel(from.r, to.r), channel(from.g, to.g), channel(from.b, to.b))
}
