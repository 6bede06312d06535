//! Terrain generation stage
//!
//! Terrain queue processor: samples the column height map and the density
//! field, classifies every voxel and publishes the finished chunk.

use super::sampler::Sampler;
use crate::config::TerrainParams;
use crate::world::core::{BlockId, ChunkPos, ColumnPos};
use crate::world::data_types::{voxel_index, ChunkData, HeightMap};
use crate::world::error::{SampleKind, WorldError, WorldResult};
use crate::world::storage::WorldStores;
use std::sync::Arc;

/// Block for a voxel at world height `y` in a column whose surface is `h`,
/// before caves are carved
pub fn classify_voxel(y: i32, h: i32, params: &TerrainParams) -> BlockId {
    if y > h {
        if y <= params.water_level {
            BlockId::WATER
        } else {
            BlockId::AIR
        }
    } else if y == h {
        if h <= params.water_level {
            BlockId::SAND
        } else {
            BlockId::GRASS
        }
    } else if y >= h - params.dirt_depth {
        BlockId::DIRT
    } else {
        BlockId::STONE
    }
}

/// Build a generated chunk from already validated samples
pub fn generate_chunk(
    pos: ChunkPos,
    size: u32,
    heights: &HeightMap,
    density: &[f32],
    params: &TerrainParams,
) -> ChunkData {
    let mut chunk = ChunkData::new(pos, size);
    let base_y = pos.y * size as i32;

    for z in 0..size {
        for y in 0..size {
            let world_y = base_y + y as i32;
            for x in 0..size {
                let index = voxel_index(x, y, z, size);
                let mut block = classify_voxel(world_y, heights.height_at(x, z), params);
                if density[index] > params.carve_threshold && !block.is_air() && !block.is_water() {
                    block = BlockId::AIR;
                }
                chunk.blocks[index] = block;
            }
        }
    }

    chunk.mark_generated()
}

pub struct TerrainStage {
    stores: Arc<WorldStores>,
    sampler: Arc<dyn Sampler>,
    params: TerrainParams,
    chunk_size: u32,
    seed: u32,
}

impl TerrainStage {
    pub fn new(
        stores: Arc<WorldStores>,
        sampler: Arc<dyn Sampler>,
        params: TerrainParams,
        chunk_size: u32,
        seed: u32,
    ) -> Self {
        Self {
            stores,
            sampler,
            params,
            chunk_size,
            seed,
        }
    }

    pub fn process(&self, pos: ChunkPos) -> WorldResult<()> {
        if self.stores.chunks.contains_key(&pos) {
            log::trace!("[TerrainStage::process] {:?} already generated, skipping", pos);
            self.stores.missing_neighbors.remove(&pos);
            return Ok(());
        }

        let heights = self.height_map(pos)?;
        let density = self.density(pos)?;
        let chunk = generate_chunk(pos, self.chunk_size, &heights, &density, &self.params);

        if !self.stores.chunks.insert_if_absent(pos, Arc::new(chunk)) {
            log::trace!("[TerrainStage::process] {:?} lost insertion race, discarding", pos);
            return Ok(());
        }

        self.stores.ready_for_mesh.insert(pos);
        self.stores.missing_neighbors.remove(&pos);
        log::trace!("[TerrainStage::process] {:?} generated", pos);
        Ok(())
    }

    /// Cached height map for the chunk's column, sampling it on first use
    fn height_map(&self, pos: ChunkPos) -> WorldResult<Arc<HeightMap>> {
        let column = pos.column();
        if let Some(cached) = self.stores.height_maps.get(&column) {
            return Ok(cached);
        }

        let heights = self.sampler.sample_heights(self.seed, column, self.chunk_size);
        let map = Arc::new(self.validate_heights(pos, column, heights)?);

        // Another worker may have sampled the same column; both are identical
        self.stores.height_maps.insert_if_absent(column, Arc::clone(&map));
        Ok(map)
    }

    fn validate_heights(
        &self,
        pos: ChunkPos,
        column: ColumnPos,
        heights: Vec<i32>,
    ) -> WorldResult<HeightMap> {
        let expected = (self.chunk_size * self.chunk_size) as usize;
        if heights.len() != expected {
            return Err(WorldError::short_sample(pos, SampleKind::Height, expected, heights.len()));
        }
        Ok(HeightMap {
            column,
            size: self.chunk_size,
            heights,
        })
    }

    fn density(&self, pos: ChunkPos) -> WorldResult<Vec<f32>> {
        let density = self.sampler.sample_density(self.seed, pos, self.chunk_size);
        let expected = (self.chunk_size as usize).pow(3);
        if density.len() != expected {
            return Err(WorldError::short_sample(pos, SampleKind::Density, expected, density.len()));
        }
        if let Some(index) = density.iter().position(|d| !d.is_finite()) {
            return Err(WorldError::MalformedSample {
                chunk: pos,
                kind: SampleKind::Density,
                reason: format!("non-finite value {} at index {}", density[index], index),
            });
        }
        Ok(density)
    }
}
