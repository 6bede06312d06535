//! Insertion-ordered, de-duplicated set of chunk positions shared between
//! the stages and the scheduler.

use crate::world::core::ChunkPos;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;

#[derive(Default)]
struct OrderedPositions {
    order: Vec<ChunkPos>,
    members: FxHashSet<ChunkPos>,
}

#[derive(Default)]
pub struct ChunkSet {
    inner: Mutex<OrderedPositions>,
}

impl ChunkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the position was already present
    pub fn insert(&self, pos: ChunkPos) -> bool {
        let mut inner = self.inner.lock();
        if !inner.members.insert(pos) {
            return false;
        }
        inner.order.push(pos);
        true
    }

    pub fn remove(&self, pos: &ChunkPos) -> bool {
        let mut inner = self.inner.lock();
        if !inner.members.remove(pos) {
            return false;
        }
        inner.order.retain(|p| p != pos);
        true
    }

    pub fn contains(&self, pos: &ChunkPos) -> bool {
        self.inner.lock().members.contains(pos)
    }

    /// Copy of the members in insertion order
    pub fn snapshot(&self) -> Vec<ChunkPos> {
        self.inner.lock().order.clone()
    }

    /// Keep only the positions for which `keep` returns true
    pub fn retain(&self, mut keep: impl FnMut(&ChunkPos) -> bool) {
        let mut inner = self.inner.lock();
        let OrderedPositions { order, members } = &mut *inner;
        order.retain(|pos| {
            let kept = keep(pos);
            if !kept {
                members.remove(pos);
            }
            kept
        });
    }

    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().order.is_empty()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.order.clear();
        inner.members.clear();
    }
}
