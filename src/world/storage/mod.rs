//! Shared world storage
//!
//! All cross-thread state of the streaming pipeline lives here. The stores
//! are owned by the scheduler and handed to each stage through one `Arc`.

mod chunk_set;
mod chunk_store;

pub use chunk_set::ChunkSet;
pub use chunk_store::ChunkStore;

use crate::renderer::mesh_data::MeshHandle;
use crate::world::core::{ChunkPos, ColumnPos};
use crate::world::data_types::{ChunkData, HeightMap};
use std::sync::Arc;

/// Every store and set the stages and the scheduler share
#[derive(Default)]
pub struct WorldStores {
    pub chunks: ChunkStore<ChunkPos, Arc<ChunkData>>,
    pub meshes: ChunkStore<ChunkPos, MeshHandle>,
    pub height_maps: ChunkStore<ColumnPos, Arc<HeightMap>>,
    /// Generated chunks whose mesh is out of date
    pub ready_for_mesh: ChunkSet,
    /// Chunks with a pending mesh waiting for promotion
    pub ready_to_show: ChunkSet,
    /// Neighbours a mesh job needed but found absent
    pub missing_neighbors: ChunkSet,
}

impl WorldStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Drop every trace of `pos` except the height map, which is shared by
    /// the whole column
    pub fn forget_chunk(&self, pos: &ChunkPos) {
        self.chunks.remove(pos);
        self.meshes.remove(pos);
        self.ready_for_mesh.remove(pos);
        self.ready_to_show.remove(pos);
        self.missing_neighbors.remove(pos);
    }

    /// Take `pos` off the mesh request list unless it still needs a mesh.
    ///
    /// Editors dirty the chunk before they insert it, so re-reading after the
    /// removal catches an edit that raced with the caller's own check.
    pub fn settle_mesh_request(&self, pos: &ChunkPos) {
        self.ready_for_mesh.remove(pos);
        let still_dirty = self
            .chunks
            .get(pos)
            .map_or(false, |chunk| chunk.is_ready_for_mesh());
        if still_dirty {
            self.ready_for_mesh.insert(*pos);
        }
    }

    /// True while some chunk of the column is still resident
    pub fn column_in_use(&self, column: ColumnPos) -> bool {
        self.chunks.keys().iter().any(|pos| pos.column() == column)
    }

    pub fn clear(&self) {
        self.chunks.clear();
        self.meshes.clear();
        self.height_maps.clear();
        self.ready_for_mesh.clear();
        self.ready_to_show.clear();
        self.missing_neighbors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forget_chunk_clears_every_store() {
        let stores = WorldStores::new();
        let pos = ChunkPos::new(1, 2, 3);
        stores.chunks.set(pos, Arc::new(ChunkData::new(pos, 4)));
        stores.meshes.set(pos, MeshHandle::Submitted { face_count: 0 });
        stores.ready_for_mesh.insert(pos);
        stores.ready_to_show.insert(pos);
        stores.missing_neighbors.insert(pos);

        stores.forget_chunk(&pos);

        assert!(!stores.chunks.contains_key(&pos));
        assert!(!stores.meshes.contains_key(&pos));
        assert!(stores.ready_for_mesh.is_empty());
        assert!(stores.ready_to_show.is_empty());
        assert!(stores.missing_neighbors.is_empty());
    }

    #[test]
    fn test_settle_mesh_request_keeps_dirty_chunks() {
        let stores = WorldStores::new();
        let clean = ChunkPos::new(0, 0, 0);
        let dirty = ChunkPos::new(1, 0, 0);
        let mut chunk = ChunkData::new(clean, 4).mark_generated();
        chunk.flags.is_dirty = false;
        stores.chunks.set(clean, Arc::new(chunk));
        stores
            .chunks
            .set(dirty, Arc::new(ChunkData::new(dirty, 4).mark_generated()));
        stores.ready_for_mesh.insert(clean);
        stores.ready_for_mesh.insert(dirty);

        stores.settle_mesh_request(&clean);
        stores.settle_mesh_request(&dirty);
        stores.settle_mesh_request(&ChunkPos::new(9, 9, 9));

        assert_eq!(stores.ready_for_mesh.snapshot(), vec![dirty]);
    }

    #[test]
    fn test_column_in_use() {
        let stores = WorldStores::new();
        let pos = ChunkPos::new(4, -1, 2);
        assert!(!stores.column_in_use(pos.column()));
        stores.chunks.set(pos, Arc::new(ChunkData::new(pos, 4)));
        assert!(stores.column_in_use(ChunkPos::new(4, 7, 2).column()));
    }
}
