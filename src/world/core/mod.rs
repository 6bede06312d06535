//! Core world data types and fundamental structures
//!
//! Value types shared by every stage of the streaming pipeline.

mod block;
mod face;
mod position;

pub use block::BlockId;
pub use face::BlockFace;
pub use position::{ChunkPos, ColumnPos, VoxelPos};
