//! Texture Atlas Data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in texture_atlas_operations.rs

use crate::world::core::BlockId;
use cgmath::Vector2;
use image::RgbaImage;
use rustc_hash::FxHashMap;

/// UV rectangle within the atlas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasUV {
    pub min: Vector2<f32>,
    pub max: Vector2<f32>,
}

/// Block to atlas rectangle lookup used while meshing
#[derive(Debug, Clone)]
pub struct BlockUvTable {
    pub uvs: FxHashMap<BlockId, AtlasUV>,
    /// Used for blocks without an entry
    pub fallback: AtlasUV,
}

/// One row of square tiles, one tile per block kind
#[derive(Debug, Clone)]
pub struct StripAtlas {
    pub image: RgbaImage,
    pub tile_size: u32,
    /// Blocks in tile order, left to right
    pub blocks: Vec<BlockId>,
    pub uv_table: BlockUvTable,
}
