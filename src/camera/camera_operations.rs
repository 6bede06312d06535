//! Viewpoint operations
//!
//! Conversions from a world-space viewpoint to the chunk grid. Positions are
//! floored, so a viewpoint at x = -0.5 lives in chunk -1, not chunk 0.

use super::camera_data::SharedViewpoint;
use crate::world::core::{ChunkPos, VoxelPos};
use cgmath::Point3;
use parking_lot::RwLock;
use std::sync::Arc;

/// Source of the position the world streams around
pub trait ViewpointProvider: Send + Sync {
    fn position(&self) -> Point3<f32>;
}

impl ViewpointProvider for Point3<f32> {
    fn position(&self) -> Point3<f32> {
        *self
    }
}

impl ViewpointProvider for SharedViewpoint {
    fn position(&self) -> Point3<f32> {
        *self.position.read()
    }
}

pub fn create_shared_viewpoint(position: Point3<f32>) -> SharedViewpoint {
    SharedViewpoint {
        position: Arc::new(RwLock::new(position)),
    }
}

pub fn move_viewpoint(viewpoint: &SharedViewpoint, position: Point3<f32>) {
    *viewpoint.position.write() = position;
}

/// Voxel containing a world-space point
pub fn viewpoint_voxel(position: Point3<f32>) -> VoxelPos {
    VoxelPos::new(
        position.x.floor() as i32,
        position.y.floor() as i32,
        position.z.floor() as i32,
    )
}

/// Chunk containing a world-space point
pub fn viewpoint_chunk_position(position: Point3<f32>, chunk_size: u32) -> ChunkPos {
    viewpoint_voxel(position).to_chunk_pos(chunk_size)
}

/// Chunks within Euclidean chunk distance `radius` of `center`, limited to
/// `vertical_radius` layers above and below
pub fn chunks_in_radius(center: ChunkPos, radius: u32, vertical_radius: u32) -> Vec<ChunkPos> {
    let r = radius as i32;
    let v = vertical_radius as i32;
    let limit = (radius as i64) * (radius as i64);
    let mut chunks = Vec::new();

    for x in -r..=r {
        for y in -v..=v {
            for z in -r..=r {
                let pos = center.offset(x, y, z);
                if center.distance_squared(pos) <= limit {
                    chunks.push(pos);
                }
            }
        }
    }
    chunks
}

pub fn log_viewpoint_context(position: Point3<f32>, chunk_size: u32) {
    let voxel = viewpoint_voxel(position);
    let chunk = voxel.to_chunk_pos(chunk_size);
    let (lx, ly, lz) = voxel.local(chunk_size);

    log::debug!(
        "[Viewpoint] Position: ({:.1}, {:.1}, {:.1}) | Chunk: ({}, {}, {}) | Local: ({}, {}, {})",
        position.x,
        position.y,
        position.z,
        chunk.x,
        chunk.y,
        chunk.z,
        lx,
        ly,
        lz
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_positions_floor() {
        assert_eq!(
            viewpoint_chunk_position(Point3::new(-0.5, 15.9, 16.0), 16),
            ChunkPos::new(-1, 0, 1)
        );
    }

    #[test]
    fn test_shared_viewpoint_moves() {
        let viewpoint = create_shared_viewpoint(Point3::new(0.0, 0.0, 0.0));
        let observer = viewpoint.clone();
        move_viewpoint(&viewpoint, Point3::new(32.0, 1.0, -3.0));
        assert_eq!(observer.position(), Point3::new(32.0, 1.0, -3.0));
    }

    #[test]
    fn test_chunks_in_radius_respects_both_limits() {
        let center = ChunkPos::new(10, 0, -4);
        let chunks = chunks_in_radius(center, 2, 1);
        assert!(chunks.contains(&center));
        assert!(chunks.contains(&center.offset(2, 0, 0)));
        assert!(!chunks.contains(&center.offset(2, 1, 0)));
        assert!(!chunks.contains(&center.offset(0, 2, 0)));
        assert!(!chunks.contains(&center.offset(2, 0, 2)));
        assert!(chunks.iter().all(|p| center.distance_to(*p) <= 2.0));
    }
}
