//! Streaming scheduler
//!
//! Runs on a single control thread. Each tick it decides which chunks must
//! exist around the viewpoint, which generated chunks need meshes, which
//! finished meshes go to the render sink and which chunks are too far away
//! to keep. Workers never block the control thread: all hand-off goes
//! through the shared stores and the two work queues.

use super::chunk_lifecycle::{ChunkState, TickStats};
use crate::camera::{
    chunks_in_radius, log_viewpoint_context, viewpoint_chunk_position, ViewpointProvider,
};
use crate::config::StreamingConfig;
use crate::error::EngineResult;
use crate::renderer::mesh_data::{ChunkTransform, MeshHandle};
use crate::renderer::mesh_stage::MeshStage;
use crate::renderer::render_sink::RenderSink;
use crate::renderer::texture_atlas_data::BlockUvTable;
use crate::renderer::texture_atlas_operations::create_color_strip_atlas;
use crate::thread_pool::{WorkQueue, WorkQueueStats, WorkerPoolConfig};
use crate::world::core::{BlockId, ChunkPos, VoxelPos};
use crate::world::generation::{NoiseSampler, Sampler, TerrainStage};
use crate::world::storage::WorldStores;
use crate::world::world_operations::{set_block, WorldModification};
use cgmath::Vector3;
use rustc_hash::FxHashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Pixel edge of one tile in the default colour atlas
const DEFAULT_TILE_SIZE: u32 = 16;

pub struct StreamingScheduler {
    config: StreamingConfig,
    stores: Arc<WorldStores>,
    terrain_queue: Arc<WorkQueue<ChunkPos>>,
    mesh_queue: WorkQueue<ChunkPos>,
    viewpoint: Arc<dyn ViewpointProvider>,
    sink: Box<dyn RenderSink>,
    visible: FxHashSet<ChunkPos>,
    last_cell: Option<ChunkPos>,
    /// Chunks the last need set asked for
    outstanding: usize,
    tick_count: u64,
}

impl StreamingScheduler {
    pub fn new(
        config: StreamingConfig,
        sampler: Arc<dyn Sampler>,
        uv_table: BlockUvTable,
        viewpoint: Arc<dyn ViewpointProvider>,
        sink: Box<dyn RenderSink>,
    ) -> EngineResult<Self> {
        if let Err(e) = config.validate() {
            log::error!("[StreamingScheduler::new] Configuration validation failed: {}", e);
            log::error!("[StreamingScheduler::new] Suggestions:\n{}", config.suggest_safe_config());
            return Err(e);
        }

        let stores = WorldStores::shared();

        let terrain_stage = TerrainStage::new(
            Arc::clone(&stores),
            sampler,
            config.terrain.clone(),
            config.chunk_size,
            config.seed,
        );
        let terrain_queue = Arc::new(WorkQueue::new(
            WorkerPoolConfig::new("terrain", config.terrain_workers),
            move |pos: ChunkPos| terrain_stage.process(pos),
        )?);

        let mesh_stage = MeshStage::new(
            Arc::clone(&stores),
            Arc::new(uv_table),
            Arc::clone(&terrain_queue),
        );
        let mesh_queue = WorkQueue::new(
            WorkerPoolConfig::new("mesh", config.mesh_workers),
            move |pos: ChunkPos| mesh_stage.process(pos),
        )?;

        log::info!(
            "[StreamingScheduler::new] Streaming {}^3 chunks, seed {}, generation radius {}",
            config.chunk_size,
            config.seed,
            config.generation_radius
        );

        Ok(Self {
            config,
            stores,
            terrain_queue,
            mesh_queue,
            viewpoint,
            sink,
            visible: FxHashSet::default(),
            last_cell: None,
            outstanding: 0,
            tick_count: 0,
        })
    }

    /// Noise terrain and a flat-colour atlas
    pub fn with_defaults(
        config: StreamingConfig,
        viewpoint: Arc<dyn ViewpointProvider>,
        sink: Box<dyn RenderSink>,
    ) -> EngineResult<Self> {
        let sampler = Arc::new(NoiseSampler::new(&config.terrain));
        let atlas = create_color_strip_atlas(&BlockId::ALL, DEFAULT_TILE_SIZE)?;
        Self::new(config, sampler, atlas.uv_table, viewpoint, sink)
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    pub fn stores(&self) -> &Arc<WorldStores> {
        &self.stores
    }

    pub fn terrain_stats(&self) -> WorkQueueStats {
        self.terrain_queue.stats()
    }

    pub fn mesh_stats(&self) -> WorkQueueStats {
        self.mesh_queue.stats()
    }

    pub fn is_visible(&self, pos: &ChunkPos) -> bool {
        self.visible.contains(pos)
    }

    pub fn visible_chunks(&self) -> Vec<ChunkPos> {
        let mut visible: Vec<ChunkPos> = self.visible.iter().copied().collect();
        visible.sort_unstable();
        visible
    }

    /// One scheduling pass
    pub fn tick(&mut self) -> EngineResult<TickStats> {
        self.tick_count += 1;
        let position = self.viewpoint.position();
        let cell = viewpoint_chunk_position(position, self.config.chunk_size);
        let cell_changed = self.last_cell != Some(cell);
        self.last_cell = Some(cell);

        let mut stats = TickStats {
            tick: self.tick_count,
            ..TickStats::default()
        };

        let retry = self.outstanding > 0 && self.terrain_queue.is_idle();
        if cell_changed || retry || !self.stores.missing_neighbors.is_empty() {
            let need = self.compute_need_set(cell);
            stats.need_set_rebuilt = true;
            stats.terrain_requested = need.len();
            self.outstanding = need.len();
            self.terrain_queue.replace_all(need);
        }

        let render_need = self.compute_render_need(cell);
        stats.mesh_requested = render_need.len();
        self.mesh_queue.replace_all(render_need);

        stats.promoted = self.promote(cell)?;
        stats.evicted = self.evict(cell)?;
        stats.resident = self.stores.chunks.len();
        stats.visible = self.visible.len();

        if cell_changed {
            log_viewpoint_context(position, self.config.chunk_size);
        }
        log::trace!("[StreamingScheduler::tick] {:?}", stats);
        Ok(stats)
    }

    /// Absent chunks near the viewpoint plus outstanding missing neighbours,
    /// nearest first
    fn compute_need_set(&self, cell: ChunkPos) -> Vec<ChunkPos> {
        let removal_limit = radius_squared(self.config.removal_radius);
        let mut need: Vec<ChunkPos> =
            chunks_in_radius(cell, self.config.generation_radius, self.config.vertical_radius)
                .into_iter()
                .filter(|pos| !self.stores.chunks.contains_key(pos))
                .collect();
        let mut seen: FxHashSet<ChunkPos> = need.iter().copied().collect();

        for missing in self.stores.missing_neighbors.snapshot() {
            if self.stores.chunks.contains_key(&missing)
                || cell.distance_squared(missing) > removal_limit
            {
                self.stores.missing_neighbors.remove(&missing);
                continue;
            }
            if seen.insert(missing) {
                need.push(missing);
            }
        }

        need.sort_by_key(|pos| cell.distance_squared(*pos));
        need
    }

    /// Generated, dirty chunks inside the render radius, nearest first
    fn compute_render_need(&self, cell: ChunkPos) -> Vec<ChunkPos> {
        let render_limit = radius_squared(self.config.render_radius);
        let mut render_need = Vec::new();

        for pos in self.stores.ready_for_mesh.snapshot() {
            match self.stores.chunks.get(&pos) {
                Some(chunk) if chunk.is_ready_for_mesh() => {
                    if cell.distance_squared(pos) <= render_limit {
                        render_need.push(pos);
                    }
                }
                // Evicted or already meshed, unless an edit lands meanwhile
                _ => self.stores.settle_mesh_request(&pos),
            }
        }

        render_need.sort_by_key(|pos| cell.distance_squared(*pos));
        render_need
    }

    /// Hand pending meshes to the sink, nearest first, up to the per-tick cap
    fn promote(&mut self, cell: ChunkPos) -> EngineResult<usize> {
        let mut ready = self.stores.ready_to_show.snapshot();
        ready.sort_by_key(|pos| cell.distance_squared(*pos));

        let mut promoted = 0;
        for pos in ready.into_iter().take(self.config.max_promotions_per_tick) {
            self.stores.ready_to_show.remove(&pos);

            let taken = self.stores.meshes.update(&pos, |handle| {
                let face_count = handle.face_count();
                std::mem::replace(handle, MeshHandle::Submitted { face_count })
            });

            let buffers = match taken {
                Some(MeshHandle::Pending(buffers)) => buffers,
                _ => continue,
            };

            if !buffers.is_empty() {
                let transform = chunk_transform(pos, self.config.chunk_size);
                self.sink.submit(pos, buffers, transform)?;
            }
            self.visible.insert(pos);
            promoted += 1;
        }
        Ok(promoted)
    }

    /// Remove everything strictly beyond the removal radius, farthest first
    fn evict(&mut self, cell: ChunkPos) -> EngineResult<usize> {
        let removal_limit = radius_squared(self.config.removal_radius);

        let mut far: Vec<ChunkPos> = self
            .stores
            .chunks
            .keys()
            .into_iter()
            .filter(|pos| cell.distance_squared(*pos) > removal_limit)
            .collect();
        far.sort_by_key(|pos| std::cmp::Reverse(cell.distance_squared(*pos)));
        far.truncate(self.config.max_evictions_per_tick);

        for pos in &far {
            self.stores.forget_chunk(pos);
            if self.visible.remove(pos) {
                self.sink.remove(*pos)?;
            }
        }

        // Meshes whose chunk vanished while a job was running
        for pos in self.stores.meshes.keys() {
            if !self.stores.chunks.contains_key(&pos) {
                self.stores.meshes.remove(&pos);
                self.stores.ready_to_show.remove(&pos);
            }
        }
        let orphaned: Vec<ChunkPos> = self
            .visible
            .iter()
            .filter(|pos| !self.stores.chunks.contains_key(pos))
            .copied()
            .collect();
        for pos in orphaned {
            self.visible.remove(&pos);
            self.sink.remove(pos)?;
        }

        // Height maps go once their column is out of range and unused
        let resident_columns: FxHashSet<_> =
            self.stores.chunks.keys().iter().map(|p| p.column()).collect();
        for column in self.stores.height_maps.keys() {
            let dx = (column.x - cell.x) as i64;
            let dz = (column.z - cell.z) as i64;
            if dx * dx + dz * dz > removal_limit && !resident_columns.contains(&column) {
                self.stores.height_maps.remove(&column);
            }
        }

        if !far.is_empty() {
            log::debug!(
                "[StreamingScheduler::evict] Evicted {} chunks beyond radius {}",
                far.len(),
                self.config.removal_radius
            );
        }
        Ok(far.len())
    }

    /// Where `pos` currently is in its lifecycle
    pub fn chunk_state(&self, pos: ChunkPos) -> ChunkState {
        let chunk = match self.stores.chunks.get(&pos) {
            Some(chunk) => chunk,
            None => {
                return if self.terrain_queue.pending_snapshot().contains(&pos) {
                    ChunkState::QueuedTerrain
                } else {
                    ChunkState::Absent
                };
            }
        };

        if self.stores.ready_to_show.contains(&pos) {
            ChunkState::ReadyToShow
        } else if chunk.flags.is_dirty {
            if self.mesh_queue.pending_snapshot().contains(&pos) {
                ChunkState::QueuedMesh
            } else {
                ChunkState::Generated
            }
        } else if self.visible.contains(&pos) {
            ChunkState::Visible
        } else {
            ChunkState::Generated
        }
    }

    /// Edit one voxel of a resident chunk; the next ticks remesh it
    pub fn edit_block(&self, pos: VoxelPos, block: BlockId) -> EngineResult<WorldModification> {
        Ok(set_block(&self.stores, pos, block, self.config.chunk_size)?)
    }

    pub fn pause_workers(&self) {
        self.terrain_queue.pause();
        self.mesh_queue.pause();
    }

    pub fn resume_workers(&self) {
        self.terrain_queue.resume();
        self.mesh_queue.resume();
    }

    /// Tick on the configured cadence until `running` is cleared
    pub fn run(&mut self, running: &AtomicBool) -> EngineResult<()> {
        let interval = self.config.tick_interval();
        log::info!("[StreamingScheduler::run] Control loop started ({:?} ticks)", interval);

        while running.load(Ordering::Relaxed) {
            let started = Instant::now();
            let stats = self.tick()?;
            if stats.promoted > 0 || stats.evicted > 0 {
                log::debug!(
                    "[StreamingScheduler::run] tick {}: +{} visible, -{} evicted, {} resident",
                    stats.tick,
                    stats.promoted,
                    stats.evicted,
                    stats.resident
                );
            }
            std::thread::sleep(interval.saturating_sub(started.elapsed()));
        }

        log::info!(
            "[StreamingScheduler::run] Control loop stopped after {} ticks",
            self.tick_count
        );
        Ok(())
    }

    /// Stop both worker pools. Idempotent; also happens on drop.
    pub fn shutdown(&self) {
        self.mesh_queue.stop();
        self.terrain_queue.stop();
    }
}

impl Drop for StreamingScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn radius_squared(radius: u32) -> i64 {
    (radius as i64) * (radius as i64)
}

fn chunk_transform(pos: ChunkPos, chunk_size: u32) -> ChunkTransform {
    let origin = pos.min_voxel(chunk_size);
    ChunkTransform {
        translation: Vector3::new(origin.x as f32, origin.y as f32, origin.z as f32),
    }
}
