//! # White and Fractal Noise Fields
//!
//! Grid-indexed noise used for navigation heightmaps.
//!
//! 1. [`generate_white_noise`] fills a field with seeded uniform samples.
//! 2. [`smooth_octave`] resamples it at a coarser period.
//! 3. [`generate_fractal_noise`] blends the octaves coarsest first.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::error::{ProceduralError, ProceduralResult};
use crate::grid::HeightField;

/// Uniform samples in [0, 1), reproducible from `seed`.
///
/// # Errors
///
/// Returns [`ProceduralError::InvalidDimensions`] if either side is zero.
pub fn generate_white_noise(width: usize, height: usize, seed: u64) -> ProceduralResult<HeightField> {
    let mut field = HeightField::new(width, height)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for y in 0..height {
        for x in 0..width {
            field.set(x, y, rng.gen::<f32>());
        }
    }
    Ok(field)
}

/// Nearest-neighbour resampling of `base` at period `2^octave`.
///
/// Every cell takes the value at the top-left corner of its enclosing
/// `2^octave` block, wrapping modulo the field size.
#[must_use]
pub fn smooth_octave(base: &HeightField, octave: u32) -> HeightField {
    let period = 1usize.checked_shl(octave).unwrap_or(usize::MAX);
    let (width, height) = (base.width(), base.height());
    let mut smoothed = base.clone();

    for y in 0..height {
        let sample_y = ((y / period) * period) % height;
        for x in 0..width {
            let sample_x = ((x / period) * period) % width;
            let value = base.get(sample_x, sample_y).unwrap_or(0.0);
            smoothed.set(x, y, value);
        }
    }
    smoothed
}

/// Blends `octave_count` smoothed octaves of `base` into fractal noise.
///
/// Octaves are summed coarsest first. Amplitude starts at 1.0 and is
/// multiplied by `persistence` before each octave is added; the sum is then
/// divided by the total amplitude and clamped into [0, 1].
///
/// # Errors
///
/// - [`ProceduralError::InvalidOctaveCount`] if `octave_count` is zero
/// - [`ProceduralError::InvalidPersistence`] if `persistence` is not a
///   finite positive number (the total amplitude would be zero)
pub fn generate_fractal_noise(
    base: &HeightField,
    octave_count: u32,
    persistence: f64,
) -> ProceduralResult<HeightField> {
    if octave_count == 0 {
        return Err(ProceduralError::InvalidOctaveCount(octave_count));
    }
    if !persistence.is_finite() || persistence <= 0.0 {
        return Err(ProceduralError::InvalidPersistence(persistence));
    }

    let mut sum = vec![0.0f64; base.values().len()];
    let mut amplitude = 1.0f64;
    let mut total_amplitude = 0.0f64;

    for octave in (0..octave_count).rev() {
        amplitude *= persistence;
        total_amplitude += amplitude;
        trace!(octave, amplitude, "blending octave");

        let smoothed = smooth_octave(base, octave);
        for (acc, &value) in sum.iter_mut().zip(smoothed.values()) {
            *acc += f64::from(value) * amplitude;
        }
    }

    // Underflow on tiny persistence with many octaves.
    if total_amplitude <= 0.0 || !total_amplitude.is_finite() {
        return Err(ProceduralError::InvalidPersistence(persistence));
    }

    let values = sum
        .into_iter()
        .map(|acc| (acc / total_amplitude) as f32)
        .collect();
    let mut field = HeightField::from_values(base.width(), base.height(), values)?;
    field.clamp_unit();
    Ok(field)
}
