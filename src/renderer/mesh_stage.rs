//! Mesh generation stage
//!
//! Turns a generated chunk into face-culled quads. A face is emitted only
//! where a solid voxel touches a transparent one, so faces shared by two
//! solid voxels never appear, including across chunk borders. A mesh is
//! all-or-nothing: if a bordering chunk is not generated yet the job aborts,
//! asks the terrain queue for the neighbour and is retried later.

use super::mesh_data::{MeshBuffers, MeshHandle};
use super::texture_atlas_data::BlockUvTable;
use super::texture_atlas_operations::block_quad_uvs;
use crate::constants::mesh::FACE_INDICES;
use crate::thread_pool::WorkQueue;
use crate::world::core::{BlockFace, BlockId, ChunkPos};
use crate::world::data_types::ChunkData;
use crate::world::error::{WorldError, WorldResult};
use crate::world::storage::WorldStores;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// One visible face found during culling
#[derive(Debug, Clone, Copy)]
struct FaceRecord {
    x: u32,
    y: u32,
    z: u32,
    face: BlockFace,
    block: BlockId,
}

/// Resolves voxels that fall outside the chunk being meshed.
///
/// Neighbour chunks are fetched on first use and kept for the rest of the
/// job, so each border is read once.
struct NeighborLookup<'a, F>
where
    F: FnMut(ChunkPos) -> Option<Arc<ChunkData>>,
{
    chunk: &'a ChunkData,
    fetch: F,
    cache: FxHashMap<ChunkPos, Arc<ChunkData>>,
}

impl<'a, F> NeighborLookup<'a, F>
where
    F: FnMut(ChunkPos) -> Option<Arc<ChunkData>>,
{
    fn new(chunk: &'a ChunkData, fetch: F) -> Self {
        Self {
            chunk,
            fetch,
            cache: FxHashMap::default(),
        }
    }

    /// Block at chunk-local coordinates that may be one step outside the chunk
    fn block_at(&mut self, x: i32, y: i32, z: i32) -> WorldResult<BlockId> {
        if let Some(block) = self.chunk.get_checked(x, y, z) {
            return Ok(block);
        }

        let s = self.chunk.size as i32;
        let owner = self
            .chunk
            .position
            .offset(x.div_euclid(s), y.div_euclid(s), z.div_euclid(s));

        if !self.cache.contains_key(&owner) {
            let neighbor = (self.fetch)(owner).ok_or(WorldError::MissingDependency {
                chunk: self.chunk.position,
                neighbor: owner,
            })?;
            self.cache.insert(owner, neighbor);
        }

        let neighbor = &self.cache[&owner];
        Ok(neighbor.get(
            x.rem_euclid(s) as u32,
            y.rem_euclid(s) as u32,
            z.rem_euclid(s) as u32,
        ))
    }
}

/// Build the mesh for `chunk`, asking `fetch` for bordering chunks on demand.
///
/// Returns `MissingDependency` for the first absent neighbour without
/// producing any geometry.
pub fn build_chunk_mesh<F>(
    chunk: &ChunkData,
    fetch: F,
    uv_table: &BlockUvTable,
) -> WorldResult<MeshBuffers>
where
    F: FnMut(ChunkPos) -> Option<Arc<ChunkData>>,
{
    let mut lookup = NeighborLookup::new(chunk, fetch);
    let mut faces = Vec::new();
    let size = chunk.size;

    for z in 0..size {
        for y in 0..size {
            for x in 0..size {
                let block = chunk.get(x, y, z);
                if block.is_air() {
                    continue;
                }

                let (ix, iy, iz) = (x as i32, y as i32, z as i32);

                if block.is_water() {
                    // Water only shows its surface, and only when open to air
                    if lookup.block_at(ix, iy + 1, iz)?.is_air() {
                        faces.push(FaceRecord {
                            x,
                            y,
                            z,
                            face: BlockFace::Top,
                            block,
                        });
                    }
                    continue;
                }

                for face in BlockFace::ALL {
                    let [dx, dy, dz] = face.offset();
                    if lookup.block_at(ix + dx, iy + dy, iz + dz)?.is_transparent() {
                        faces.push(FaceRecord { x, y, z, face, block });
                    }
                }
            }
        }
    }

    let mut mesh = MeshBuffers::with_face_capacity(faces.len());
    for record in &faces {
        push_face(&mut mesh, record, uv_table);
    }
    Ok(mesh)
}

fn push_face(mesh: &mut MeshBuffers, record: &FaceRecord, uv_table: &BlockUvTable) {
    let base = mesh.positions.len() as u32;
    let origin = [record.x as f32, record.y as f32, record.z as f32];
    let normal = record.face.normal();
    let uvs = block_quad_uvs(uv_table, record.block);

    for (corner, uv) in record.face.corners().iter().zip(uvs) {
        mesh.positions.push([
            origin[0] + corner[0],
            origin[1] + corner[1],
            origin[2] + corner[2],
        ]);
        mesh.uvs.push(uv);
        mesh.normals.push(normal);
    }
    mesh.indices.extend(FACE_INDICES.iter().map(|i| base + i));
}

/// Mesh queue processor
pub struct MeshStage {
    stores: Arc<WorldStores>,
    uv_table: Arc<BlockUvTable>,
    terrain_queue: Arc<WorkQueue<ChunkPos>>,
}

impl MeshStage {
    pub fn new(
        stores: Arc<WorldStores>,
        uv_table: Arc<BlockUvTable>,
        terrain_queue: Arc<WorkQueue<ChunkPos>>,
    ) -> Self {
        Self {
            stores,
            uv_table,
            terrain_queue,
        }
    }

    pub fn process(&self, pos: ChunkPos) -> WorldResult<()> {
        let chunk = match self.stores.chunks.get(&pos) {
            Some(chunk) => chunk,
            None => {
                log::trace!("[MeshStage::process] {:?} no longer resident, skipping", pos);
                return Ok(());
            }
        };

        if !chunk.is_ready_for_mesh() {
            log::trace!("[MeshStage::process] {:?} mesh already current, skipping", pos);
            self.stores.settle_mesh_request(&pos);
            return Ok(());
        }

        let stores = &self.stores;
        let mesh = match build_chunk_mesh(&chunk, |p| stores.chunks.get(&p), &self.uv_table) {
            Ok(mesh) => mesh,
            Err(WorldError::MissingDependency { chunk: c, neighbor }) => {
                // Keep asking for the neighbour until it exists; `pos` stays
                // in ready_for_mesh and is retried on a later tick
                if self.stores.missing_neighbors.insert(neighbor) {
                    log::debug!(
                        "[MeshStage::process] {:?} waits on {:?}, requesting terrain",
                        c,
                        neighbor
                    );
                }
                self.terrain_queue.enqueue(neighbor);
                return Err(WorldError::MissingDependency { chunk: c, neighbor });
            }
            Err(e) => return Err(e),
        };

        let meshed_revision = chunk.revision;
        let face_count = mesh.face_count();
        drop(chunk);

        let current = self.stores.chunks.update(&pos, |entry| {
            if entry.revision == meshed_revision {
                Arc::make_mut(entry).flags.is_dirty = false;
                true
            } else {
                false
            }
        });

        let Some(cleared) = current else {
            log::trace!("[MeshStage::process] {:?} evicted while meshing, dropping mesh", pos);
            return Ok(());
        };

        self.stores.meshes.set(pos, MeshHandle::Pending(mesh));
        self.stores.ready_to_show.insert(pos);
        if cleared {
            self.stores.settle_mesh_request(&pos);
        } else {
            log::trace!("[MeshStage::process] {:?} changed while meshing, will remesh", pos);
        }

        log::trace!("[MeshStage::process] {:?} meshed with {} faces", pos, face_count);
        Ok(())
    }
}
