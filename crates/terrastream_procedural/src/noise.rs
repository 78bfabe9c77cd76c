//! # Seeded Gradient Noise
//!
//! Continuous 2D simplex noise keyed by a [`WorldSeed`].
//!
//! Noise is a function of real-valued coordinates, so two tiles sampling
//! the same world position read the same value and their borders meet
//! without stitching.
//!
//! ## Determinism Guarantee
//!
//! Given the same `WorldSeed`, every sample is bit-identical on any
//! platform: the permutation table is shuffled with a fixed xorshift stream
//! and the sampling math uses only `f64` arithmetic.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed.
///
/// Serialized as the `i64` with the same bits, since formats such as TOML
/// only carry signed 64-bit integers. Seeds of `2^63` and above appear
/// negative on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl Serialize for WorldSeed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0 as i64)
    }
}

impl<'de> Deserialize<'de> for WorldSeed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(|bits| Self(bits as u64))
    }
}

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives an independent sub-seed for a specific purpose.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        let mut hash = self.0 ^ purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0x5EED_7E44_A1B0_0001)
    }
}

/// Twelve gradient directions around the unit square.
const GRADIENTS: [[i8; 2]; 12] = [
    [1, 0],
    [1, 1],
    [0, 1],
    [-1, 1],
    [-1, 0],
    [-1, -1],
    [0, -1],
    [1, -1],
    [1, 0],
    [0, 1],
    [-1, 0],
    [0, -1],
];

/// Seed-shuffled lattice hash.
struct Permutation {
    /// 256 entries, doubled so `perm[i + perm[j]]` never wraps.
    table: [u8; 512],
}

impl Permutation {
    fn new(seed: WorldSeed) -> Self {
        let mut table = [0u8; 512];
        for (i, slot) in table.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // A zero state would leave xorshift stuck at zero.
        let mut state = seed.value() | 1;
        for i in (1..256).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let j = (state % (i as u64 + 1)) as usize;
            table.swap(i, j);
        }

        table.copy_within(0..256, 256);
        Self { table }
    }

    #[inline]
    fn at(&self, index: usize) -> usize {
        usize::from(self.table[index & 511])
    }

    #[inline]
    fn gradient(&self, i: i64, j: i64) -> [i8; 2] {
        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        GRADIENTS[self.at(ii + self.at(jj)) % 12]
    }
}

/// 2D simplex noise generator.
///
/// Produces smooth, continuous values in [-1, 1].
///
/// ```rust,ignore
/// let noise = SimplexNoise::new(WorldSeed::new(42));
/// let value = noise.sample(100.5, 200.3);
/// assert!((-1.0..=1.0).contains(&value));
/// ```
pub struct SimplexNoise {
    permutation: Permutation,
}

impl SimplexNoise {
    /// Skewing factor: (sqrt(3) - 1) / 2.
    const F2: f64 = 0.366_025_403_784_438_6;
    /// Unskewing factor: (3 - sqrt(3)) / 6.
    const G2: f64 = 0.211_324_865_405_187_1;

    /// Creates a new simplex noise generator from a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            permutation: Permutation::new(seed),
        }
    }

    /// Samples 2D simplex noise, returning a value in [-1, 1].
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let skew = (x + y) * Self::F2;
        let i = (x + skew).floor() as i64;
        let j = (y + skew).floor() as i64;

        let unskew = (i + j) as f64 * Self::G2;
        let x0 = x - (i as f64 - unskew);
        let y0 = y - (j as f64 - unskew);

        // Lower or upper triangle of the skewed cell.
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + Self::G2;
        let y1 = y0 - j1 as f64 + Self::G2;
        let x2 = x0 - 1.0 + 2.0 * Self::G2;
        let y2 = y0 - 1.0 + 2.0 * Self::G2;

        let n0 = corner(x0, y0, self.permutation.gradient(i, j));
        let n1 = corner(x1, y1, self.permutation.gradient(i + i1, j + j1));
        let n2 = corner(x2, y2, self.permutation.gradient(i + 1, j + 1));

        (70.0 * (n0 + n1 + n2)).clamp(-1.0, 1.0)
    }

    /// Octave-summed noise, normalized back into [-1, 1].
    ///
    /// `persistence` scales amplitude and `lacunarity` scales frequency
    /// from one octave to the next. Zero octaves yields 0.
    #[must_use]
    pub fn octaved(&self, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }
}

/// Contribution of one simplex corner.
#[inline]
fn corner(x: f64, y: f64, gradient: [i8; 2]) -> f64 {
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        0.0
    } else {
        let t2 = t * t;
        t2 * t2 * (x * f64::from(gradient[0]) + y * f64::from(gradient[1]))
    }
}
