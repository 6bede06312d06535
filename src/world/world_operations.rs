//! World Operations - Pure DOP Functions
//!
//! This is the PUBLIC API for reading and editing the streamed world.
//! Every function takes the shared stores explicitly; there is no global
//! world. Edits go through copy-on-write so readers holding an older
//! `Arc<ChunkData>` keep a consistent snapshot.

use super::core::{BlockId, ChunkPos, VoxelPos};
use super::data_types::{ChunkData, WorldStats};
use super::error::{WorldError, WorldResult};
use super::storage::WorldStores;
use std::sync::Arc;

// ============================================================================
// BLOCK OPERATIONS
// ============================================================================

/// Get block at position, or `None` if its chunk is not resident
pub fn get_block(stores: &WorldStores, pos: VoxelPos, chunk_size: u32) -> Option<BlockId> {
    let chunk = stores.chunks.get(&voxel_to_chunk(pos, chunk_size))?;
    let (x, y, z) = get_local_position(pos, chunk_size);
    Some(chunk.get(x, y, z))
}

/// Set block at position and schedule the affected meshes for rebuilding.
///
/// Edits on a chunk border also dirty the resident neighbour across that
/// border, since its culled faces may change.
pub fn set_block(
    stores: &WorldStores,
    pos: VoxelPos,
    block_id: BlockId,
    chunk_size: u32,
) -> WorldResult<WorldModification> {
    let chunk_pos = voxel_to_chunk(pos, chunk_size);
    let (x, y, z) = get_local_position(pos, chunk_size);

    let edit = stores.chunks.update(&chunk_pos, |entry| {
        if entry.size != chunk_size {
            return Err(WorldError::InvalidPosition(pos));
        }
        let old_block = entry.get(x, y, z);
        if old_block != block_id {
            Arc::make_mut(entry).set(x, y, z, block_id);
        }
        Ok((old_block, entry.revision))
    });

    let (old_block, revision) = edit.ok_or(WorldError::ChunkNotLoaded(chunk_pos))??;

    if old_block != block_id {
        stores.ready_for_mesh.insert(chunk_pos);
        for neighbor in border_neighbors(chunk_pos, (x, y, z), chunk_size) {
            mark_chunk_dirty(stores, neighbor);
        }
    }

    Ok(WorldModification {
        position: pos,
        old_block,
        new_block: block_id,
        revision,
    })
}

/// Chunks sharing a face with the voxel at local `(x, y, z)`
fn border_neighbors(chunk_pos: ChunkPos, local: (u32, u32, u32), chunk_size: u32) -> Vec<ChunkPos> {
    let last = chunk_size - 1;
    let mut neighbors = Vec::new();
    let axes = [(local.0, [1, 0, 0]), (local.1, [0, 1, 0]), (local.2, [0, 0, 1])];

    for (coord, [dx, dy, dz]) in axes {
        if coord == 0 {
            neighbors.push(chunk_pos.offset(-dx, -dy, -dz));
        }
        if coord == last {
            neighbors.push(chunk_pos.offset(dx, dy, dz));
        }
    }
    neighbors
}

/// Flag a resident chunk for remeshing. Returns `false` if it is not
/// resident.
pub fn mark_chunk_dirty(stores: &WorldStores, chunk_pos: ChunkPos) -> bool {
    let marked = stores
        .chunks
        .update(&chunk_pos, |entry| {
            let chunk = Arc::make_mut(entry);
            chunk.flags.is_dirty = true;
            // An in-flight mesh of the old contents must not clear the flag
            chunk.revision += 1;
        })
        .is_some();

    if marked {
        stores.ready_for_mesh.insert(chunk_pos);
    }
    marked
}

/// World modification record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldModification {
    pub position: VoxelPos,
    pub old_block: BlockId,
    pub new_block: BlockId,
    /// Chunk revision after the edit
    pub revision: u64,
}

// ============================================================================
// BATCH OPERATIONS
// ============================================================================

/// Set multiple blocks, stopping at the first failure
pub fn set_blocks_batch(
    stores: &WorldStores,
    modifications: &[(VoxelPos, BlockId)],
    chunk_size: u32,
) -> WorldResult<Vec<WorldModification>> {
    modifications
        .iter()
        .map(|(pos, block)| set_block(stores, *pos, *block, chunk_size))
        .collect()
}

pub fn get_blocks_batch(
    stores: &WorldStores,
    positions: &[VoxelPos],
    chunk_size: u32,
) -> Vec<Option<BlockId>> {
    positions
        .iter()
        .map(|pos| get_block(stores, *pos, chunk_size))
        .collect()
}

// ============================================================================
// CHUNK QUERIES
// ============================================================================

pub fn is_chunk_loaded(stores: &WorldStores, chunk_pos: ChunkPos) -> bool {
    stores.chunks.contains_key(&chunk_pos)
}

pub fn get_chunk(stores: &WorldStores, chunk_pos: ChunkPos) -> Option<Arc<ChunkData>> {
    stores.chunks.get(&chunk_pos)
}

/// Resident chunk positions, sorted for stable output
pub fn get_loaded_chunks(stores: &WorldStores) -> Vec<ChunkPos> {
    let mut chunks = stores.chunks.keys();
    chunks.sort_unstable();
    chunks
}

pub fn get_active_chunk_count(stores: &WorldStores) -> usize {
    stores.chunks.len()
}

// ============================================================================
// COORDINATE HELPERS
// ============================================================================

pub fn voxel_to_chunk(pos: VoxelPos, chunk_size: u32) -> ChunkPos {
    pos.to_chunk_pos(chunk_size)
}

/// World position of a chunk's minimum corner
pub fn chunk_to_world(chunk_pos: ChunkPos, chunk_size: u32) -> VoxelPos {
    chunk_pos.min_voxel(chunk_size)
}

pub fn get_local_position(pos: VoxelPos, chunk_size: u32) -> (u32, u32, u32) {
    pos.local(chunk_size)
}

// ============================================================================
// DIAGNOSTICS
// ============================================================================

pub fn get_world_stats(stores: &WorldStores) -> WorldStats {
    let chunks = stores.chunks.values();
    WorldStats {
        loaded_chunks: chunks.len(),
        dirty_chunks: chunks.iter().filter(|c| c.flags.is_dirty).count(),
        meshed_chunks: stores.meshes.len(),
        cached_height_maps: stores.height_maps.len(),
        non_air_blocks: chunks.iter().map(|c| c.non_air_count() as u64).sum(),
    }
}

pub fn log_world_stats(stores: &WorldStores) {
    let stats = get_world_stats(stores);
    log::info!("[World] Statistics:");
    log::info!("  Loaded chunks: {}", stats.loaded_chunks);
    log::info!("  Dirty chunks: {}", stats.dirty_chunks);
    log::info!("  Meshed chunks: {}", stats.meshed_chunks);
    log::info!("  Cached height maps: {}", stats.cached_height_maps);
    log::info!("  Non-air blocks: {}", stats.non_air_blocks);
    log::info!(
        "  Pending sets: mesh={} show={} missing={}",
        stores.ready_for_mesh.len(),
        stores.ready_to_show.len(),
        stores.missing_neighbors.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: u32 = 4;

    fn resident(stores: &WorldStores, pos: ChunkPos) {
        let mut chunk = ChunkData::new(pos, S).mark_generated();
        chunk.flags.is_dirty = false;
        stores.chunks.set(pos, Arc::new(chunk));
    }

    #[test]
    fn test_get_block_absent_chunk() {
        let stores = WorldStores::new();
        assert_eq!(get_block(&stores, VoxelPos::new(0, 0, 0), S), None);
        resident(&stores, ChunkPos::new(-1, 0, 0));
        assert_eq!(get_block(&stores, VoxelPos::new(-1, 0, 0), S), Some(BlockId::AIR));
    }

    #[test]
    fn test_set_block_dirties_and_queues() {
        let stores = WorldStores::new();
        let pos = ChunkPos::new(0, 0, 0);
        resident(&stores, pos);

        let change = set_block(&stores, VoxelPos::new(1, 1, 1), BlockId::STONE, S)
            .expect("chunk resident");
        assert_eq!(change.old_block, BlockId::AIR);
        assert_eq!(change.revision, 1);
        assert_eq!(get_block(&stores, VoxelPos::new(1, 1, 1), S), Some(BlockId::STONE));
        assert!(stores.chunks.get(&pos).expect("resident").flags.is_dirty);
        assert_eq!(stores.ready_for_mesh.snapshot(), vec![pos]);
    }

    #[test]
    fn test_border_edit_dirties_neighbour() {
        let stores = WorldStores::new();
        let pos = ChunkPos::new(0, 0, 0);
        let right = ChunkPos::new(1, 0, 0);
        resident(&stores, pos);
        resident(&stores, right);

        set_block(&stores, VoxelPos::new(3, 1, 1), BlockId::DIRT, S).expect("chunk resident");

        let neighbour = stores.chunks.get(&right).expect("resident");
        assert!(neighbour.flags.is_dirty);
        assert_eq!(neighbour.revision, 1);
        assert!(stores.ready_for_mesh.contains(&right));
    }

    #[test]
    fn test_unchanged_block_is_not_an_edit() {
        let stores = WorldStores::new();
        resident(&stores, ChunkPos::new(0, 0, 0));
        let change =
            set_block(&stores, VoxelPos::new(0, 0, 0), BlockId::AIR, S).expect("chunk resident");
        assert_eq!(change.revision, 0);
        assert!(stores.ready_for_mesh.is_empty());
    }

    #[test]
    fn test_set_block_on_absent_chunk() {
        let stores = WorldStores::new();
        let result = set_block(&stores, VoxelPos::new(0, -1, 0), BlockId::STONE, S);
        assert!(
            matches!(result, Err(WorldError::ChunkNotLoaded(p)) if p == ChunkPos::new(0, -1, 0))
        );
    }

    #[test]
    fn test_border_neighbors() {
        let origin = ChunkPos::new(0, 0, 0);
        assert!(border_neighbors(origin, (1, 1, 1), S).is_empty());
        assert_eq!(
            border_neighbors(origin, (0, 3, 1), S),
            vec![ChunkPos::new(-1, 0, 0), ChunkPos::new(0, 1, 0)]
        );
    }

    #[test]
    fn test_snapshot_readers_are_unaffected() {
        let stores = WorldStores::new();
        let pos = ChunkPos::new(0, 0, 0);
        resident(&stores, pos);
        let before = get_chunk(&stores, pos).expect("resident");

        set_block(&stores, VoxelPos::new(2, 2, 2), BlockId::SAND, S).expect("chunk resident");

        assert_eq!(before.get(2, 2, 2), BlockId::AIR);
        assert_eq!(get_chunk(&stores, pos).expect("resident").get(2, 2, 2), BlockId::SAND);
    }

    #[test]
    fn test_world_stats() {
        let stores = WorldStores::new();
        resident(&stores, ChunkPos::new(0, 0, 0));
        set_blocks_batch(
            &stores,
            &[
                (VoxelPos::new(0, 0, 0), BlockId::STONE),
                (VoxelPos::new(1, 0, 0), BlockId::STONE),
            ],
            S,
        )
        .expect("chunk resident");

        let stats = get_world_stats(&stores);
        assert_eq!(stats.loaded_chunks, 1);
        assert_eq!(stats.dirty_chunks, 1);
        assert_eq!(stats.non_air_blocks, 2);
        assert_eq!(get_loaded_chunks(&stores), vec![ChunkPos::new(0, 0, 0)]);
        assert_eq!(
            get_blocks_batch(&stores, &[VoxelPos::new(1, 0, 0), VoxelPos::new(9, 9, 9)], S),
            vec![Some(BlockId::STONE), None]
        );
    }
}
