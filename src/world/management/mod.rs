//! World management: the streaming scheduler and the chunk lifecycle it drives

pub mod chunk_lifecycle;
pub mod streaming_scheduler;

pub use chunk_lifecycle::{ChunkState, TickStats};
pub use streaming_scheduler::StreamingScheduler;
