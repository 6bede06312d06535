//! Camera Module - Data-Oriented Programming (DOP) style
//!
//! The viewpoint the world streams around:
//! - camera_data.rs: Pure data structures with NO methods
//! - camera_operations.rs: The provider trait and functions on positions

pub mod camera_data;
pub mod camera_operations;

pub use camera_data::SharedViewpoint;

pub use camera_operations::{
    chunks_in_radius, create_shared_viewpoint, log_viewpoint_context, move_viewpoint,
    viewpoint_chunk_position, viewpoint_voxel, ViewpointProvider,
};
