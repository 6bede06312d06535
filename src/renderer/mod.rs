//! Renderer Module
//!
//! CPU-side mesh generation and the hand-off to whatever draws it. Nothing
//! here touches a GPU; the render sink owns that side.

pub mod mesh_data;
pub mod mesh_stage;
pub mod render_sink;
pub mod texture_atlas_data;
pub mod texture_atlas_operations;

pub use mesh_data::{ChunkTransform, MeshBuffers, MeshHandle};
pub use mesh_stage::{build_chunk_mesh, MeshStage};
pub use render_sink::{ChannelRenderSink, RenderCommand, RenderSink};
pub use texture_atlas_data::{AtlasUV, BlockUvTable, StripAtlas};
pub use texture_atlas_operations::{
    block_quad_uvs, create_color_strip_atlas, create_strip_atlas, create_uv_table, lookup_uv,
    save_strip_atlas, set_block_uv,
};
