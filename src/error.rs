//! Error handling for hearth-stream
//!
//! A single crate-level error type for everything outside the per-item stage
//! processing (configuration, I/O, thread lifecycle). Stage failures are
//! `WorldError`s and convert into `EngineError` at the crate boundary.

use crate::world::error::WorldError;
use std::error::Error as StdError;
use std::fmt;

/// Main error type for hearth-stream
#[derive(Debug)]
pub enum EngineError {
    // World Errors
    ChunkNotLoaded {
        pos: (i32, i32, i32),
    },
    World(WorldError),

    // Threading Errors
    ChannelClosed {
        name: String,
    },
    TaskJoinError {
        task: String,
    },

    // Configuration Errors
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },

    // System Errors
    IoError {
        path: String,
        error: String,
    },
    ParseError {
        value: String,
        expected_type: String,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::ChunkNotLoaded { pos } => {
                write!(f, "Chunk not loaded at position {:?}", pos)
            }
            EngineError::World(err) => write!(f, "World error: {}", err),

            EngineError::ChannelClosed { name } => write!(f, "Channel closed: {}", name),
            EngineError::TaskJoinError { task } => write!(f, "Task join error: {}", task),

            EngineError::InvalidConfig {
                field,
                value,
                reason,
            } => write!(f, "Invalid config: {} = {} ({})", field, value, reason),

            EngineError::IoError { path, error } => write!(f, "IO error for {}: {}", path, error),
            EngineError::ParseError {
                value,
                expected_type,
            } => write!(
                f,
                "Parse error: '{}' is not a valid {}",
                value, expected_type
            ),
        }
    }
}

impl StdError for EngineError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            EngineError::World(err) => Some(err),
            _ => None,
        }
    }
}

/// Type alias for Results in hearth-stream
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub(crate) fn invalid_config(field: &str, value: impl fmt::Display, reason: &str) -> Self {
        EngineError::InvalidConfig {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

// Conversion traits for common error types

impl From<std::io::Error> for EngineError {
    fn from(error: std::io::Error) -> Self {
        EngineError::IoError {
            path: String::new(),
            error: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(error: toml::de::Error) -> Self {
        EngineError::ParseError {
            value: error.message().to_string(),
            expected_type: "StreamingConfig".to_string(),
        }
    }
}

impl From<WorldError> for EngineError {
    fn from(error: WorldError) -> Self {
        match error {
            WorldError::ChunkNotLoaded(pos) => EngineError::ChunkNotLoaded {
                pos: (pos.x, pos.y, pos.z),
            },
            other => EngineError::World(other),
        }
    }
}

impl<T> From<crossbeam_channel::SendError<T>> for EngineError {
    fn from(_: crossbeam_channel::SendError<T>) -> Self {
        EngineError::ChannelClosed {
            name: "crossbeam".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::core::ChunkPos;

    #[test]
    fn test_error_display() {
        let err = EngineError::invalid_config("chunk_size", 0, "must be non-zero");
        assert_eq!(
            err.to_string(),
            "Invalid config: chunk_size = 0 (must be non-zero)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: EngineError = io.into();
        match err {
            EngineError::IoError { error, .. } => assert!(error.contains("file not found")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_world_error_conversion() {
        let err: EngineError = WorldError::ChunkNotLoaded(ChunkPos::new(1, 2, 3)).into();
        assert!(matches!(err, EngineError::ChunkNotLoaded { pos: (1, 2, 3) }));
    }
}
