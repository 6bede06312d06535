//! Terrain generation: sampling collaborators and the terrain stage

pub mod sampler;
pub mod terrain_stage;

pub use sampler::{NoiseSampler, Sampler};
pub use terrain_stage::{classify_voxel, generate_chunk, TerrainStage};
