//! Streaming configuration
//!
//! Every knob of the pipeline in one serde struct. Missing fields fall back
//! to the defaults in [`crate::constants`], so a TOML file only needs the
//! values it changes.

use crate::constants::{core, streaming, terrain};
use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Terrain shaping parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// Density above which solid voxels become air
    pub carve_threshold: f32,
    /// Air at or below this world Y becomes water
    pub water_level: i32,
    pub dirt_depth: i32,
    pub min_surface_height: i32,
    pub max_surface_height: i32,
    pub height_frequency: f64,
    pub height_octaves: usize,
    pub cave_frequency: f64,
    pub cave_octaves: usize,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            carve_threshold: terrain::CARVE_THRESHOLD,
            water_level: terrain::WATER_LEVEL,
            dirt_depth: terrain::DIRT_DEPTH,
            min_surface_height: terrain::MIN_SURFACE_HEIGHT,
            max_surface_height: terrain::MAX_SURFACE_HEIGHT,
            height_frequency: terrain::HEIGHT_FREQUENCY,
            height_octaves: terrain::HEIGHT_OCTAVES,
            cave_frequency: terrain::CAVE_FREQUENCY,
            cave_octaves: terrain::CAVE_OCTAVES,
        }
    }
}

/// Main streaming configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    pub chunk_size: u32,
    pub seed: u32,
    /// Chunks within this distance are generated
    pub generation_radius: u32,
    /// Chunks within this distance are meshed
    pub render_radius: u32,
    /// Chunks strictly beyond this distance are evicted
    pub removal_radius: u32,
    /// Vertical half-extent of the generation box, in chunks
    pub vertical_radius: u32,
    pub tick_interval_ms: u64,
    pub max_promotions_per_tick: usize,
    pub max_evictions_per_tick: usize,
    pub terrain_workers: usize,
    pub mesh_workers: usize,
    pub terrain: TerrainParams,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        let (terrain_workers, mesh_workers) = default_worker_split(num_cpus::get());
        Self {
            chunk_size: core::CHUNK_SIZE,
            seed: core::DEFAULT_SEED,
            generation_radius: streaming::GENERATION_RADIUS,
            render_radius: streaming::RENDER_RADIUS,
            removal_radius: streaming::REMOVAL_RADIUS,
            vertical_radius: streaming::VERTICAL_RADIUS,
            tick_interval_ms: streaming::TICK_INTERVAL_MS,
            max_promotions_per_tick: streaming::MAX_PROMOTIONS_PER_TICK,
            max_evictions_per_tick: streaming::MAX_EVICTIONS_PER_TICK,
            terrain_workers,
            mesh_workers,
            terrain: TerrainParams::default(),
        }
    }
}

/// Leave one core for the control thread; terrain gets the larger share
fn default_worker_split(cpus: usize) -> (usize, usize) {
    let available = cpus.saturating_sub(1).max(2);
    let terrain = (available + 1) / 2;
    (terrain, (available - terrain).max(1))
}

impl StreamingConfig {
    pub fn from_toml_str(source: &str) -> EngineResult<Self> {
        let config: StreamingConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> EngineResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| EngineError::IoError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        log::info!("[StreamingConfig::load] Loading {}", path.display());
        Self::from_toml_str(&source)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> EngineResult<()> {
        if self.chunk_size == 0 {
            return Err(EngineError::invalid_config("chunk_size", 0, "cannot be 0"));
        }
        if self.chunk_size > core::MAX_CHUNK_SIZE {
            return Err(EngineError::invalid_config(
                "chunk_size",
                self.chunk_size,
                &format!("exceeds maximum of {}", core::MAX_CHUNK_SIZE),
            ));
        }

        if self.generation_radius == 0 {
            return Err(EngineError::invalid_config("generation_radius", 0, "cannot be 0"));
        }
        if self.render_radius > self.generation_radius {
            return Err(EngineError::invalid_config(
                "render_radius",
                self.render_radius,
                "must not exceed generation_radius",
            ));
        }
        // A chunk meshed at the render edge needs its neighbours one step out
        if self.removal_radius < self.generation_radius || self.removal_radius <= self.render_radius
        {
            return Err(EngineError::invalid_config(
                "removal_radius",
                self.removal_radius,
                "must be at least generation_radius and greater than render_radius",
            ));
        }

        if self.tick_interval_ms == 0 {
            return Err(EngineError::invalid_config("tick_interval_ms", 0, "cannot be 0"));
        }
        if self.max_promotions_per_tick == 0 {
            return Err(EngineError::invalid_config("max_promotions_per_tick", 0, "cannot be 0"));
        }
        if self.max_evictions_per_tick == 0 {
            return Err(EngineError::invalid_config("max_evictions_per_tick", 0, "cannot be 0"));
        }
        if self.terrain_workers == 0 {
            return Err(EngineError::invalid_config("terrain_workers", 0, "cannot be 0"));
        }
        if self.mesh_workers == 0 {
            return Err(EngineError::invalid_config("mesh_workers", 0, "cannot be 0"));
        }

        let t = &self.terrain;
        if t.min_surface_height > t.max_surface_height {
            return Err(EngineError::invalid_config(
                "terrain.min_surface_height",
                t.min_surface_height,
                "must not exceed terrain.max_surface_height",
            ));
        }
        if t.dirt_depth < 0 {
            return Err(EngineError::invalid_config(
                "terrain.dirt_depth",
                t.dirt_depth,
                "cannot be negative",
            ));
        }
        if !t.carve_threshold.is_finite() {
            return Err(EngineError::invalid_config(
                "terrain.carve_threshold",
                t.carve_threshold,
                "must be finite",
            ));
        }
        if t.height_octaves == 0 || t.cave_octaves == 0 {
            return Err(EngineError::invalid_config(
                "terrain.octaves",
                format!("{}/{}", t.height_octaves, t.cave_octaves),
                "need at least one octave",
            ));
        }

        log::info!(
            "[StreamingConfig] Validated: chunk_size={}, radii gen/render/remove={}/{}/{}, workers terrain/mesh={}/{}, ~{} chunks resident",
            self.chunk_size,
            self.generation_radius,
            self.render_radius,
            self.removal_radius,
            self.terrain_workers,
            self.mesh_workers,
            self.estimated_resident_chunks()
        );
        Ok(())
    }

    /// Upper bound on chunks inside the generation volume
    pub fn estimated_resident_chunks(&self) -> u64 {
        let r = self.generation_radius as u64;
        let v = self.vertical_radius.min(self.generation_radius) as u64;
        (2 * r + 1) * (2 * r + 1) * (2 * v + 1)
    }

    /// Human-readable hints printed next to a validation failure
    pub fn suggest_safe_config(&self) -> String {
        let mut suggestions = Vec::new();

        let voxel_bytes = std::mem::size_of::<crate::world::core::BlockId>() as u64;
        let chunk_bytes = (self.chunk_size.max(1) as u64).pow(3) * voxel_bytes;
        suggestions.push(format!(
            "Current settings keep ~{} chunks ({}MB of voxels) resident",
            self.estimated_resident_chunks(),
            self.estimated_resident_chunks() * chunk_bytes / 1024 / 1024
        ));

        suggestions.push(
            "Radii must satisfy render < removal, render <= generation <= removal".to_string(),
        );
        suggestions.push("Common safe configurations:".to_string());
        suggestions.push(format!(
            "  - chunk_size={}, generation_radius=4, render_radius=3, removal_radius=6",
            core::CHUNK_SIZE
        ));
        suggestions.push(format!(
            "  - chunk_size={}, generation_radius=8, render_radius=6, removal_radius=10",
            core::CHUNK_SIZE
        ));

        suggestions.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = StreamingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_size, 16);
        assert_eq!(config.seed, 12345);
        assert_eq!(config.terrain.carve_threshold, 0.5);
        assert_eq!(config.terrain.dirt_depth, 3);
    }

    #[test]
    fn test_worker_split() {
        assert_eq!(default_worker_split(1), (1, 1));
        assert_eq!(default_worker_split(8), (4, 3));
        assert_eq!(default_worker_split(16), (8, 7));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = StreamingConfig::from_toml_str(
            r#"
            seed = 7
            render_radius = 2

            [terrain]
            water_level = 10
            "#,
        )
        .expect("valid config");
        assert_eq!(config.seed, 7);
        assert_eq!(config.render_radius, 2);
        assert_eq!(config.terrain.water_level, 10);
        assert_eq!(config.chunk_size, 16);
        assert_eq!(config.terrain.dirt_depth, 3);
    }

    #[test]
    fn test_radius_ordering_rejected() {
        let config = StreamingConfig {
            render_radius: 6,
            removal_radius: 6,
            generation_radius: 6,
            ..StreamingConfig::default()
        };
        match config.validate() {
            Err(EngineError::InvalidConfig { field, .. }) => assert_eq!(field, "removal_radius"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!config.suggest_safe_config().is_empty());
    }

    #[test]
    fn test_zero_values_rejected() {
        for config in [
            StreamingConfig {
                chunk_size: 0,
                ..StreamingConfig::default()
            },
            StreamingConfig {
                mesh_workers: 0,
                ..StreamingConfig::default()
            },
            StreamingConfig {
                tick_interval_ms: 0,
                ..StreamingConfig::default()
            },
        ] {
            assert!(matches!(config.validate(), Err(EngineError::InvalidConfig { .. })));
        }
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let result = StreamingConfig::from_toml_str("chunk_size = \"big\"");
        assert!(matches!(result, Err(EngineError::ParseError { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "chunk_size = 8\nterrain_workers = 2\nmesh_workers = 1").expect("write");

        let config = StreamingConfig::load(file.path()).expect("config should load");
        assert_eq!(config.chunk_size, 8);
        assert_eq!(config.terrain_workers, 2);
        assert_eq!(config.mesh_workers, 1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = StreamingConfig::load(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(EngineError::IoError { .. })));
    }
}
