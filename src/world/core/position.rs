use serde::{Deserialize, Serialize};

/// Chunk position in chunk-space (not world units)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Projection onto the (x, z) column shared by a vertical chunk stack
    pub const fn column(self) -> ColumnPos {
        ColumnPos {
            x: self.x,
            z: self.z,
        }
    }

    /// Euclidean distance in chunk units
    pub fn distance_to(self, other: ChunkPos) -> f32 {
        (self.distance_squared(other) as f32).sqrt()
    }

    pub fn distance_squared(self, other: ChunkPos) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dy * dy + dz * dz
    }

    /// World-space voxel at the chunk's minimum corner
    pub fn min_voxel(self, chunk_size: u32) -> VoxelPos {
        let s = chunk_size as i32;
        VoxelPos::new(self.x * s, self.y * s, self.z * s)
    }
}

/// Key of the height map cache: one entry per vertical chunk stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnPos {
    pub x: i32,
    pub z: i32,
}

/// Voxel position in world space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoxelPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Owning chunk, using floor division so negatives land correctly
    pub fn to_chunk_pos(self, chunk_size: u32) -> ChunkPos {
        let s = chunk_size as i32;
        ChunkPos::new(self.x.div_euclid(s), self.y.div_euclid(s), self.z.div_euclid(s))
    }

    /// Position inside the owning chunk, each component in `0..chunk_size`
    pub fn local(self, chunk_size: u32) -> (u32, u32, u32) {
        let s = chunk_size as i32;
        (
            self.x.rem_euclid(s) as u32,
            self.y.rem_euclid(s) as u32,
            self.z.rem_euclid(s) as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_voxels_floor_into_chunks() {
        let voxel = VoxelPos::new(-1, -16, -17);
        assert_eq!(voxel.to_chunk_pos(16), ChunkPos::new(-1, -1, -2));
        assert_eq!(voxel.local(16), (15, 0, 15));
    }

    #[test]
    fn test_distance_is_euclidean() {
        let a = ChunkPos::new(0, 0, 0);
        let b = ChunkPos::new(3, 4, 0);
        assert_eq!(a.distance_squared(b), 25);
        assert!((a.distance_to(b) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_column_projection_drops_y() {
        assert_eq!(ChunkPos::new(2, -7, 5).column(), ChunkPos::new(2, 9, 5).column());
    }
}
