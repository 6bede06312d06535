//! Thread Pool Module
//!
//! One generic priority work queue backed by a fixed worker pool. The
//! terrain and mesh stages each own an instance with their own processor.

mod thread_pool_data;
mod thread_pool_operations;

pub use thread_pool_data::{Processor, WorkQueueStats, WorkerPoolConfig};
pub use thread_pool_operations::WorkQueue;
