//! Density field generation from 3D coherent noise.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin, Simplex};

use crate::params::{NoiseConfig, NoiseKind, TerrainDims};

/// Lattice step between noise samples, in noise-space units
const SAMPLE_SCALE: f64 = 1.0;

/// Octave count for the fractal simplex variant
const FBM_OCTAVES: usize = 3;

/// Dense 3D scalar field of terrain density values in `[0, 1]`.
///
/// Flat row-major layout with x fastest-varying: sample `(x, y, z)` lives at
/// `y * depth * width + z * width + x`. Generated once at startup and
/// immutable afterwards; the GPU copy is a 3D texture uploaded from this
/// buffer.
pub struct DensityGrid {
    values: Vec<f32>,
    dims: TerrainDims,
}

impl DensityGrid {
    /// Generate the field by sampling the configured noise over the corner
    /// lattice. Noise output in `[-1, 1]` is remapped to `[0, 1]`.
    pub fn generate(dims: TerrainDims, config: &NoiseConfig) -> Self {
        let noise = build_noise(config);

        let mut values = Vec::with_capacity(dims.sample_count());
        for y in 0..dims.height {
            for z in 0..dims.depth {
                for x in 0..dims.width {
                    let n = noise.get([
                        x as f64 * SAMPLE_SCALE,
                        z as f64 * SAMPLE_SCALE,
                        y as f64 * SAMPLE_SCALE,
                    ]) as f32;
                    // fBm can overshoot [-1, 1] slightly; clamp after remap.
                    values.push(((n + 1.0) * 0.5).clamp(0.0, 1.0));
                }
            }
        }

        Self { values, dims }
    }

    pub fn dims(&self) -> TerrainDims {
        self.dims
    }

    /// Flat index of sample `(x, y, z)`
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        y * self.dims.depth * self.dims.width + z * self.dims.width + x
    }

    /// Density at corner `(x, y, z)`
    pub fn get(&self, x: usize, y: usize, z: usize) -> f32 {
        self.values[self.index(x, y, z)]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Raw bytes for texture upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.values)
    }
}

/// Wire the configured noise variant from the `noise` crate.
fn build_noise(config: &NoiseConfig) -> Box<dyn NoiseFn<f64, 3>> {
    match config.kind {
        NoiseKind::FractalSimplex => Box::new(
            Fbm::<Simplex>::new(config.seed)
                .set_octaves(FBM_OCTAVES)
                .set_frequency(config.frequency),
        ),
        NoiseKind::Perlin => Box::new(Scaled {
            inner: Perlin::new(config.seed),
            frequency: config.frequency,
        }),
    }
}

/// Applies a uniform frequency to a noise source without fractal layering.
struct Scaled<N> {
    inner: N,
    frequency: f64,
}

impl<N: NoiseFn<f64, 3>> NoiseFn<f64, 3> for Scaled<N> {
    fn get(&self, point: [f64; 3]) -> f64 {
        self.inner.get([
            point[0] * self.frequency,
            point[1] * self.frequency,
            point[2] * self.frequency,
        ])
    }
}
