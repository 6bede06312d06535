//! Mesh Data
//!
//! CPU-side geometry produced by the mesh stage and the handle stored for it
//! until the scheduler hands it to the render sink.

use crate::constants::mesh::{INDICES_PER_FACE, VERTICES_PER_FACE};

/// Face-culled chunk geometry in chunk-local voxel units
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub uvs: Vec<[f32; 2]>,
    /// One normal per vertex
    pub normals: Vec<[f32; 3]>,
}

impl MeshBuffers {
    /// Buffers sized for exactly `face_count` quads
    pub fn with_face_capacity(face_count: usize) -> Self {
        let vertices = face_count * VERTICES_PER_FACE;
        Self {
            positions: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(face_count * INDICES_PER_FACE),
            uvs: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
        }
    }

    pub fn face_count(&self) -> usize {
        self.positions.len() / VERTICES_PER_FACE
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Raw bytes of the position buffer, ready for a vertex upload
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }
}

/// Mesh store entry for one chunk
#[derive(Debug, Clone, PartialEq)]
pub enum MeshHandle {
    /// Built, waiting to be promoted
    Pending(MeshBuffers),
    /// Buffers were moved into the render sink
    Submitted { face_count: usize },
}

impl MeshHandle {
    pub fn face_count(&self) -> usize {
        match self {
            MeshHandle::Pending(buffers) => buffers.face_count(),
            MeshHandle::Submitted { face_count } => *face_count,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, MeshHandle::Pending(_))
    }
}

/// Where a chunk's local geometry sits in the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkTransform {
    /// World-space position of the chunk's minimum corner
    pub translation: cgmath::Vector3<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_capacity_is_exact() {
        let buffers = MeshBuffers::with_face_capacity(10);
        assert!(buffers.positions.capacity() >= 40);
        assert!(buffers.indices.capacity() >= 60);
        assert!(buffers.is_empty());
    }

    #[test]
    fn test_byte_views() {
        let buffers = MeshBuffers {
            positions: vec![[0.0; 3]; 4],
            indices: vec![0, 1, 2, 0, 2, 3],
            uvs: vec![[0.0; 2]; 4],
            normals: vec![[0.0, 1.0, 0.0]; 4],
        };
        assert_eq!(buffers.position_bytes().len(), 4 * 12);
        assert_eq!(buffers.index_bytes().len(), 6 * 4);
        assert_eq!(buffers.uv_bytes().len(), 4 * 8);
        assert_eq!(buffers.face_count(), 1);
        assert_eq!(MeshHandle::Pending(buffers).face_count(), 1);
        assert_eq!(MeshHandle::Submitted { face_count: 3 }.face_count(), 3);
    }
}
