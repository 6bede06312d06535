//! World Data Types
//!
//! Plain data shared between the terrain stage, the mesh stage and the
//! scheduler. Voxel grids are flat vectors; the index functions below are the
//! single source of truth for their layout.

use super::core::{BlockId, ChunkPos, ColumnPos};

/// Linear index of a voxel inside a chunk: `x + y*S + z*S*S`.
///
/// Matches the layout of the density samples so writer and reader agree.
#[inline]
pub fn voxel_index(x: u32, y: u32, z: u32, size: u32) -> usize {
    (x + y * size + z * size * size) as usize
}

/// Linear index of a column inside a height map: `x + z*S`
#[inline]
pub fn column_index(x: u32, z: u32, size: u32) -> usize {
    (x + z * size) as usize
}

/// Single chunk's data
#[derive(Clone, Debug)]
pub struct ChunkData {
    /// Chunk position in chunk coordinates
    pub position: ChunkPos,

    /// Edge length in voxels
    pub size: u32,

    /// Block IDs (flat array: size^3 blocks, see [`voxel_index`])
    pub blocks: Vec<BlockId>,

    /// Chunk metadata flags
    pub flags: ChunkMetadata,

    /// Bumped on every block mutation; the mesh stage only clears `is_dirty`
    /// if the revision it meshed is still current
    pub revision: u64,
}

/// Chunk metadata
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkMetadata {
    pub is_generated: bool,
    pub is_dirty: bool,
}

impl ChunkData {
    /// Create new all-air chunk, not yet generated
    pub fn new(position: ChunkPos, size: u32) -> Self {
        Self::filled(position, size, BlockId::AIR)
    }

    /// Create chunk filled with a specific block
    pub fn filled(position: ChunkPos, size: u32, block: BlockId) -> Self {
        let total_blocks = (size * size * size) as usize;

        Self {
            position,
            size,
            blocks: vec![block; total_blocks],
            flags: ChunkMetadata::default(),
            revision: 0,
        }
    }

    /// Mark as freshly generated: terrain complete, mesh out of date
    pub fn mark_generated(mut self) -> Self {
        self.flags.is_generated = true;
        self.flags.is_dirty = true;
        self
    }

    pub fn get(&self, x: u32, y: u32, z: u32) -> BlockId {
        self.blocks[voxel_index(x, y, z, self.size)]
    }

    /// Local lookup that tolerates out-of-range coordinates
    pub fn get_checked(&self, x: i32, y: i32, z: i32) -> Option<BlockId> {
        let s = self.size as i32;
        if (0..s).contains(&x) && (0..s).contains(&y) && (0..s).contains(&z) {
            Some(self.get(x as u32, y as u32, z as u32))
        } else {
            None
        }
    }

    pub fn set(&mut self, x: u32, y: u32, z: u32, block: BlockId) {
        let index = voxel_index(x, y, z, self.size);
        self.blocks[index] = block;
        self.revision += 1;
        self.flags.is_dirty = true;
    }

    pub fn is_ready_for_mesh(&self) -> bool {
        self.flags.is_generated && self.flags.is_dirty
    }

    pub fn non_air_count(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_air()).count()
    }
}

/// Surface heights of one column of chunks
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeightMap {
    pub column: ColumnPos,
    pub size: u32,
    /// World-Y surface height per (x, z), see [`column_index`]
    pub heights: Vec<i32>,
}

impl HeightMap {
    pub fn height_at(&self, x: u32, z: u32) -> i32 {
        self.heights[column_index(x, z, self.size)]
    }
}

/// World statistics
#[derive(Clone, Copy, Debug, Default)]
pub struct WorldStats {
    pub loaded_chunks: usize,
    pub dirty_chunks: usize,
    pub meshed_chunks: usize,
    pub cached_height_maps: usize,
    pub non_air_blocks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voxel_index_layout() {
        assert_eq!(voxel_index(0, 0, 0, 16), 0);
        assert_eq!(voxel_index(1, 0, 0, 16), 1);
        assert_eq!(voxel_index(0, 1, 0, 16), 16);
        assert_eq!(voxel_index(0, 0, 1, 16), 256);
        assert_eq!(voxel_index(15, 15, 15, 16), 4095);
    }

    #[test]
    fn test_set_bumps_revision_and_dirties() {
        let mut chunk = ChunkData::new(ChunkPos::new(0, 0, 0), 4).mark_generated();
        chunk.flags.is_dirty = false;
        chunk.set(1, 2, 3, BlockId::STONE);
        assert_eq!(chunk.get(1, 2, 3), BlockId::STONE);
        assert_eq!(chunk.revision, 1);
        assert!(chunk.is_ready_for_mesh());
    }

    #[test]
    fn test_get_checked_rejects_outside() {
        let chunk = ChunkData::filled(ChunkPos::new(0, 0, 0), 4, BlockId::DIRT);
        assert_eq!(chunk.get_checked(3, 3, 3), Some(BlockId::DIRT));
        assert_eq!(chunk.get_checked(-1, 0, 0), None);
        assert_eq!(chunk.get_checked(0, 4, 0), None);
    }
}
