//! Engine-wide constants
//!
//! Defaults for the streaming configuration live here so tests, the config
//! layer and the demo agree on the same numbers.

/// Core voxel constants
pub mod core {
    /// Default chunk edge length in voxels
    pub const CHUNK_SIZE: u32 = 16;

    /// Largest chunk edge the validator accepts
    pub const MAX_CHUNK_SIZE: u32 = 128;

    /// Default world seed
    pub const DEFAULT_SEED: u32 = 12345;
}

/// Terrain classification constants
pub mod terrain {
    /// Density above which solid voxels are carved into caves
    pub const CARVE_THRESHOLD: f32 = 0.5;

    /// Thickness of the dirt shell below the surface block
    pub const DIRT_DEPTH: i32 = 3;

    /// Global water level (world Y)
    pub const WATER_LEVEL: i32 = 6;

    /// Lowest generated surface height (world Y)
    pub const MIN_SURFACE_HEIGHT: i32 = 4;

    /// Highest generated surface height (world Y)
    pub const MAX_SURFACE_HEIGHT: i32 = 28;

    /// Surface noise, sampled per world (x, z)
    pub const HEIGHT_FREQUENCY: f64 = 0.01;
    pub const HEIGHT_OCTAVES: usize = 4;

    /// Cave noise, sampled per world voxel (frequency 0.5 over a scale of 12)
    pub const CAVE_FREQUENCY: f64 = 0.5 / 12.0;
    pub const CAVE_OCTAVES: usize = 2;
}

/// Mesh layout constants
pub mod mesh {
    /// Vertices emitted per visible face
    pub const VERTICES_PER_FACE: usize = 4;

    /// Indices emitted per visible face (two triangles)
    pub const INDICES_PER_FACE: usize = 6;

    /// Index pattern for one quad
    pub const FACE_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];
}

/// Streaming defaults
pub mod streaming {
    pub const GENERATION_RADIUS: u32 = 4;
    pub const RENDER_RADIUS: u32 = 3;
    pub const REMOVAL_RADIUS: u32 = 6;
    pub const VERTICAL_RADIUS: u32 = 2;
    pub const TICK_INTERVAL_MS: u64 = 100;
    pub const MAX_PROMOTIONS_PER_TICK: usize = 8;
    pub const MAX_EVICTIONS_PER_TICK: usize = 32;
}
