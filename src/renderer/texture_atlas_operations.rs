//! Texture Atlas Operations - Pure DOP Functions
//!
//! All functions are pure: take data, return results, no side effects.
//! The one exception is [`save_strip_atlas`], which writes the image to disk.

use super::texture_atlas_data::{AtlasUV, BlockUvTable, StripAtlas};
use crate::error::{EngineError, EngineResult};
use crate::world::core::BlockId;
use cgmath::Vector2;
use image::{imageops, DynamicImage, Rgba, RgbaImage};
use rustc_hash::FxHashMap;
use std::path::Path;

/// The whole texture, used when a block has no tile
pub fn full_tile_uv() -> AtlasUV {
    AtlasUV {
        min: Vector2::new(0.0, 0.0),
        max: Vector2::new(1.0, 1.0),
    }
}

/// Transform local UV (0-1) to atlas UV
pub fn transform_uv(atlas_uv: &AtlasUV, local_uv: Vector2<f32>) -> Vector2<f32> {
    Vector2::new(
        atlas_uv.min.x + (atlas_uv.max.x - atlas_uv.min.x) * local_uv.x,
        atlas_uv.min.y + (atlas_uv.max.y - atlas_uv.min.y) * local_uv.y,
    )
}

/// Quad UVs in face winding order: top-left, top-right, bottom-right,
/// bottom-left
pub fn quad_uvs(atlas_uv: &AtlasUV) -> [[f32; 2]; 4] {
    QUAD_CORNERS.map(|corner| {
        let uv = transform_uv(atlas_uv, corner);
        [uv.x, uv.y]
    })
}

const QUAD_CORNERS: [Vector2<f32>; 4] = [
    Vector2 { x: 0.0, y: 0.0 },
    Vector2 { x: 1.0, y: 0.0 },
    Vector2 { x: 1.0, y: 1.0 },
    Vector2 { x: 0.0, y: 1.0 },
];

/// Table with no entries: every block maps to the full tile
pub fn create_uv_table() -> BlockUvTable {
    BlockUvTable {
        uvs: FxHashMap::default(),
        fallback: full_tile_uv(),
    }
}

pub fn set_block_uv(table: &mut BlockUvTable, block: BlockId, uv: AtlasUV) {
    table.uvs.insert(block, uv);
}

pub fn lookup_uv(table: &BlockUvTable, block: BlockId) -> AtlasUV {
    table.uvs.get(&block).copied().unwrap_or(table.fallback)
}

/// The four UVs the mesh stage writes for one face of `block`
pub fn block_quad_uvs(table: &BlockUvTable, block: BlockId) -> [[f32; 2]; 4] {
    quad_uvs(&lookup_uv(table, block))
}

/// Horizontal strip of `tile_size` tiles, tile `i` spanning
/// `u in [i/n, (i+1)/n]` and the full `v` range
pub fn create_strip_atlas(
    tiles: &[(BlockId, DynamicImage)],
    tile_size: u32,
) -> EngineResult<StripAtlas> {
    if tile_size == 0 {
        return Err(EngineError::invalid_config("tile_size", 0, "must be non-zero"));
    }
    if tiles.is_empty() {
        return Err(EngineError::invalid_config("tiles", 0, "atlas needs at least one tile"));
    }

    let count = tiles.len() as u32;
    let mut image = RgbaImage::new(tile_size * count, tile_size);
    let mut table = create_uv_table();
    let mut blocks = Vec::with_capacity(tiles.len());

    for (index, (block, tile)) in tiles.iter().enumerate() {
        let index = index as u32;
        let mut rgba = tile.to_rgba8();
        if rgba.width() != tile_size || rgba.height() != tile_size {
            log::debug!(
                "[create_strip_atlas] Resizing tile for {} from {}x{} to {}",
                block,
                rgba.width(),
                rgba.height(),
                tile_size
            );
            rgba = imageops::resize(&rgba, tile_size, tile_size, imageops::FilterType::Nearest);
        }
        imageops::replace(&mut image, &rgba, (index * tile_size) as i64, 0);

        set_block_uv(
            &mut table,
            *block,
            AtlasUV {
                min: Vector2::new(index as f32 / count as f32, 0.0),
                max: Vector2::new((index + 1) as f32 / count as f32, 1.0),
            },
        );
        blocks.push(*block);
    }

    log::info!(
        "[texture_atlas_operations::create_strip_atlas] Built {}x{} atlas with {} tiles",
        image.width(),
        image.height(),
        count
    );

    Ok(StripAtlas {
        image,
        tile_size,
        blocks,
        uv_table: table,
    })
}

/// Strip atlas of flat-coloured tiles, one per block's base colour
pub fn create_color_strip_atlas(blocks: &[BlockId], tile_size: u32) -> EngineResult<StripAtlas> {
    let tiles: Vec<(BlockId, DynamicImage)> = blocks
        .iter()
        .map(|block| {
            let tile = RgbaImage::from_pixel(tile_size, tile_size, Rgba(block.base_color()));
            (*block, DynamicImage::ImageRgba8(tile))
        })
        .collect();
    create_strip_atlas(&tiles, tile_size)
}

pub fn save_strip_atlas(atlas: &StripAtlas, path: &Path) -> EngineResult<()> {
    atlas.image.save(path).map_err(|e| EngineError::IoError {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;
    log::info!(
        "[texture_atlas_operations::save_strip_atlas] Wrote atlas to {}",
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_block_uses_full_tile() {
        let table = create_uv_table();
        assert_eq!(
            block_quad_uvs(&table, BlockId::STONE),
            [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
        );
    }

    #[test]
    fn test_strip_uvs_partition_the_width() {
        let atlas = create_color_strip_atlas(&[BlockId::GRASS, BlockId::DIRT], 8)
            .expect("atlas should build");
        assert_eq!(atlas.image.dimensions(), (16, 8));

        let dirt = lookup_uv(&atlas.uv_table, BlockId::DIRT);
        assert_eq!(dirt.min, Vector2::new(0.5, 0.0));
        assert_eq!(dirt.max, Vector2::new(1.0, 1.0));
        assert_eq!(
            *atlas.image.get_pixel(12, 4),
            Rgba(BlockId::DIRT.base_color())
        );
    }

    #[test]
    fn test_tiles_are_resized() {
        let big = DynamicImage::ImageRgba8(RgbaImage::from_pixel(32, 32, Rgba([1, 2, 3, 255])));
        let atlas = create_strip_atlas(&[(BlockId::SAND, big)], 4).expect("atlas should build");
        assert_eq!(atlas.image.dimensions(), (4, 4));
        assert_eq!(*atlas.image.get_pixel(3, 3), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_empty_atlas_rejected() {
        assert!(create_strip_atlas(&[], 16).is_err());
        assert!(create_color_strip_atlas(&[BlockId::SAND], 0).is_err());
    }

    #[test]
    fn test_save_strip_atlas() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("atlas.png");
        let atlas = create_color_strip_atlas(&BlockId::ALL, 2).expect("atlas should build");
        save_strip_atlas(&atlas, &path).expect("atlas should save");
        assert!(path.exists());
    }

    #[test]
    fn test_transform_uv() {
        let uv = AtlasUV {
            min: Vector2::new(0.5, 0.0),
            max: Vector2::new(1.0, 1.0),
        };
        assert_eq!(transform_uv(&uv, Vector2::new(0.5, 0.5)), Vector2::new(0.75, 0.5));
    }
}
