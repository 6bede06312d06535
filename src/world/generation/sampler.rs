//! Terrain sampling
//!
//! The terrain stage asks a [`Sampler`] for two fields per chunk: surface
//! heights for the chunk's column and a 3D density field used to carve
//! caves. Both must be deterministic in `(seed, position)`.

use crate::config::TerrainParams;
use crate::world::core::{ChunkPos, ColumnPos};
use noise::{Fbm, MultiFractal, NoiseFn, Simplex};

pub trait Sampler: Send + Sync {
    /// `size * size` world-Y surface heights, laid out `x + z * size`
    fn sample_heights(&self, seed: u32, column: ColumnPos, size: u32) -> Vec<i32>;

    /// `size^3` values in `[-1, 1]`, laid out `x + y * size + z * size^2`
    fn sample_density(&self, seed: u32, chunk: ChunkPos, size: u32) -> Vec<f32>;
}

/// Fractal simplex noise for both fields
#[derive(Debug, Clone)]
pub struct NoiseSampler {
    min_height: i32,
    max_height: i32,
    height_frequency: f64,
    height_octaves: usize,
    cave_frequency: f64,
    cave_octaves: usize,
}

impl NoiseSampler {
    pub fn new(params: &TerrainParams) -> Self {
        Self {
            min_height: params.min_surface_height,
            max_height: params.max_surface_height,
            height_frequency: params.height_frequency,
            height_octaves: params.height_octaves,
            cave_frequency: params.cave_frequency,
            cave_octaves: params.cave_octaves,
        }
    }

    fn surface_noise(&self, seed: u32) -> Fbm<Simplex> {
        Fbm::<Simplex>::new(seed)
            .set_frequency(self.height_frequency)
            .set_octaves(self.height_octaves)
    }

    fn cave_noise(&self, seed: u32) -> Fbm<Simplex> {
        // Offset so caves do not line up with the surface pattern
        Fbm::<Simplex>::new(seed.wrapping_add(1))
            .set_frequency(self.cave_frequency)
            .set_octaves(self.cave_octaves)
    }
}

impl Default for NoiseSampler {
    fn default() -> Self {
        Self::new(&TerrainParams::default())
    }
}

impl Sampler for NoiseSampler {
    fn sample_heights(&self, seed: u32, column: ColumnPos, size: u32) -> Vec<i32> {
        let noise = self.surface_noise(seed);
        let s = size as i64;
        let span = (self.max_height - self.min_height) as f64;
        let mut heights = Vec::with_capacity((size * size) as usize);

        for z in 0..s {
            for x in 0..s {
                let wx = column.x as i64 * s + x;
                let wz = column.z as i64 * s + z;
                let value = noise.get([wx as f64, wz as f64]).clamp(-1.0, 1.0);
                let t = (value + 1.0) / 2.0;
                heights.push(self.min_height + (span * t).round() as i32);
            }
        }
        heights
    }

    fn sample_density(&self, seed: u32, chunk: ChunkPos, size: u32) -> Vec<f32> {
        let noise = self.cave_noise(seed);
        let s = size as i64;
        let mut density = Vec::with_capacity((size * size * size) as usize);

        for z in 0..s {
            for y in 0..s {
                for x in 0..s {
                    let wx = chunk.x as i64 * s + x;
                    let wy = chunk.y as i64 * s + y;
                    let wz = chunk.z as i64 * s + z;
                    let value = noise.get([wx as f64, wy as f64, wz as f64]);
                    density.push(value.clamp(-1.0, 1.0) as f32);
                }
            }
        }
        density
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_lengths() {
        let sampler = NoiseSampler::default();
        assert_eq!(sampler.sample_heights(1, ColumnPos { x: 0, z: 0 }, 8).len(), 64);
        assert_eq!(sampler.sample_density(1, ChunkPos::new(0, 0, 0), 8).len(), 512);
    }

    #[test]
    fn test_heights_stay_in_range() {
        let params = TerrainParams::default();
        let sampler = NoiseSampler::new(&params);
        for column in [ColumnPos { x: 0, z: 0 }, ColumnPos { x: -5, z: 17 }] {
            for h in sampler.sample_heights(42, column, 16) {
                assert!(h >= params.min_surface_height && h <= params.max_surface_height);
            }
        }
    }

    #[test]
    fn test_density_in_unit_range() {
        let sampler = NoiseSampler::default();
        let density = sampler.sample_density(9, ChunkPos::new(-2, 1, 3), 8);
        assert!(density.iter().all(|d| d.is_finite() && (-1.0..=1.0).contains(d)));
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let sampler = NoiseSampler::default();
        let pos = ChunkPos::new(3, -1, 2);
        assert_eq!(
            sampler.sample_density(5, pos, 8),
            sampler.sample_density(5, pos, 8)
        );
        assert_eq!(
            sampler.sample_heights(5, pos.column(), 8),
            sampler.sample_heights(5, pos.column(), 8)
        );
    }
}
