//! World Module
//!
//! Everything about the voxel world that is not rendering.
//!
//! # Architecture Overview
//!
//! - **Core**: Fundamental data types (blocks, positions, faces)
//! - **Storage**: Thread-safe stores shared by the pipeline stages
//! - **Generation**: Sampling collaborators and the terrain stage
//! - **Management**: The streaming scheduler and chunk lifecycle
//! - **Operations**: Public functions for reading and editing blocks

pub mod core;
pub mod data_types;
pub mod error;
pub mod generation;
pub mod management;
pub mod storage;
pub mod world_operations;

// Re-export core types for convenience
pub use core::{BlockFace, BlockId, ChunkPos, ColumnPos, VoxelPos};

pub use data_types::{ChunkData, ChunkMetadata, HeightMap, WorldStats};
pub use error::{SampleKind, WorldError, WorldResult};
pub use generation::{NoiseSampler, Sampler, TerrainStage};
pub use management::{ChunkState, StreamingScheduler, TickStats};
pub use storage::{ChunkSet, ChunkStore, WorldStores};

// Re-export world operations as the primary editing API
pub use world_operations::{
    chunk_to_world, get_active_chunk_count, get_block, get_blocks_batch, get_chunk,
    get_loaded_chunks, get_local_position, get_world_stats, is_chunk_loaded, log_world_stats,
    mark_chunk_dirty, set_block, set_blocks_batch, voxel_to_chunk, WorldModification,
};
