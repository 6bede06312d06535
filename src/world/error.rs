/// World Error Handling
///
/// Error types raised by the pipeline stages. Every variant is recoverable:
/// stages return them to the worker pool, which logs and moves on.
use crate::world::core::{ChunkPos, VoxelPos};

/// World-specific result type
pub type WorldResult<T> = Result<T, WorldError>;

/// Which sample a malformed response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Height,
    Density,
}

impl std::fmt::Display for SampleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleKind::Height => write!(f, "height"),
            SampleKind::Density => write!(f, "density"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("Chunk {chunk:?} needs neighbour {neighbor:?} which is not generated yet")]
    MissingDependency { chunk: ChunkPos, neighbor: ChunkPos },

    #[error("Malformed {kind} sample for chunk {chunk:?}: {reason}")]
    MalformedSample {
        chunk: ChunkPos,
        kind: SampleKind,
        reason: String,
    },

    #[error("Chunk not loaded: {0:?}")]
    ChunkNotLoaded(ChunkPos),

    #[error("Invalid position: {0:?}")]
    InvalidPosition(VoxelPos),
}

impl WorldError {
    /// Recoverable by the scheduler's normal retry path
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WorldError::MissingDependency { .. } | WorldError::MalformedSample { .. }
        )
    }

    pub(crate) fn short_sample(
        chunk: ChunkPos,
        kind: SampleKind,
        expected: usize,
        found: usize,
    ) -> Self {
        WorldError::MalformedSample {
            chunk,
            kind,
            reason: format!("expected {} values, found {}", expected, found),
        }
    }
}
