//! Render submission
//!
//! The scheduler hands finished meshes to a [`RenderSink`] and tells it when
//! a chunk leaves the visible set. The sink owns everything GPU-side.

use super::mesh_data::{ChunkTransform, MeshBuffers};
use crate::error::EngineResult;
use crate::world::core::ChunkPos;
use crossbeam_channel::{Receiver, Sender};

pub trait RenderSink: Send {
    /// Take ownership of a chunk's geometry and show it at `transform`
    fn submit(
        &mut self,
        pos: ChunkPos,
        mesh: MeshBuffers,
        transform: ChunkTransform,
    ) -> EngineResult<()>;

    /// Stop showing the chunk; a no-op for chunks never submitted
    fn remove(&mut self, pos: ChunkPos) -> EngineResult<()>;
}

/// Message sent to the render thread
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    Upload {
        pos: ChunkPos,
        mesh: MeshBuffers,
        transform: ChunkTransform,
    },
    Remove {
        pos: ChunkPos,
    },
}

/// Forwards commands to a render thread over a channel
pub struct ChannelRenderSink {
    sender: Sender<RenderCommand>,
}

impl ChannelRenderSink {
    pub fn new(sender: Sender<RenderCommand>) -> Self {
        Self { sender }
    }

    /// Sink plus the receiving end for the render thread
    pub fn unbounded() -> (Self, Receiver<RenderCommand>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Self::new(sender), receiver)
    }
}

impl RenderSink for ChannelRenderSink {
    fn submit(
        &mut self,
        pos: ChunkPos,
        mesh: MeshBuffers,
        transform: ChunkTransform,
    ) -> EngineResult<()> {
        self.sender.send(RenderCommand::Upload {
            pos,
            mesh,
            transform,
        })?;
        Ok(())
    }

    fn remove(&mut self, pos: ChunkPos) -> EngineResult<()> {
        self.sender.send(RenderCommand::Remove { pos })?;
        Ok(())
    }
}
