// Hearth Stream - streaming voxel terrain
//
// Terrain and meshes are produced by two worker pools and kept in shared
// stores; a single control thread decides what to generate, show and evict
// as the viewpoint moves.
//
// Entry points:
// - world::StreamingScheduler to run the pipeline
// - world_operations for reading and editing blocks
// - renderer::RenderSink to receive finished meshes

// Constants module
pub mod constants;

// Core modules
pub mod config;
pub mod error;

// Essential systems
pub mod camera;
pub mod renderer;
pub mod thread_pool;
pub mod world;

pub use camera::{SharedViewpoint, ViewpointProvider};
pub use config::{StreamingConfig, TerrainParams};
pub use error::{EngineError, EngineResult};
pub use renderer::{ChannelRenderSink, MeshBuffers, RenderCommand, RenderSink};
pub use thread_pool::{WorkQueue, WorkQueueStats, WorkerPoolConfig};

// === Core World Types ===
pub use world::core::{BlockFace, BlockId, ChunkPos, ColumnPos, VoxelPos};
pub use world::{
    ChunkData, ChunkState, NoiseSampler, Sampler, StreamingScheduler, TickStats, WorldError,
    WorldResult, WorldStores,
};
