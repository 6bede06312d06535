//! Chunk lifecycle states
//!
//! `Absent -> QueuedTerrain -> Generated -> QueuedMesh -> ReadyToShow ->
//! Visible -> Absent`. A mesh job that finds a neighbour missing leaves the
//! chunk `Generated` until the neighbour exists and the job is retried.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// Not resident and not requested
    Absent,
    /// Waiting on the terrain queue
    QueuedTerrain,
    /// Resident with an out-of-date mesh and not currently queued for meshing
    Generated,
    /// Waiting on the mesh queue
    QueuedMesh,
    /// Mesh built, waiting for promotion
    ReadyToShow,
    /// Mesh handed to the render sink and current
    Visible,
}

impl fmt::Display for ChunkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChunkState::Absent => "absent",
            ChunkState::QueuedTerrain => "queued for terrain",
            ChunkState::Generated => "generated",
            ChunkState::QueuedMesh => "queued for mesh",
            ChunkState::ReadyToShow => "ready to show",
            ChunkState::Visible => "visible",
        };
        write!(f, "{}", name)
    }
}

/// Per-tick summary returned by the scheduler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub tick: u64,
    /// Whether the terrain need set was rebuilt this tick
    pub need_set_rebuilt: bool,
    pub terrain_requested: usize,
    pub mesh_requested: usize,
    pub promoted: usize,
    pub evicted: usize,
    pub resident: usize,
    pub visible: usize,
}
