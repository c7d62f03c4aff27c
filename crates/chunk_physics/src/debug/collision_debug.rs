//! Collision-specific debug diagnostics
//!
//! The physics step publishes one [`CollisionDebugFrame`] per tick into a
//! [`CollisionDebugSink`]; a renderer or tool holding a clone of the sink
//! reads it back. Publishing swaps the whole frame under the write lock, so
//! readers see either the previous frame or the new one, never a mix.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::ecs::Entity;
use crate::foundation::math::Vec3;
use crate::physics::collision::Aabb;

bitflags::bitflags! {
    /// Per-entity debug display options
    #[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
    pub struct DebugFlags: u8 {
        /// Publish the entity's world-space collider bounds
        const SHOW_COLLIDERS = 1 << 0;
        /// Publish the bounds of every chunk the entity occupies
        const SHOW_CHUNKS = 1 << 1;
    }
}

/// Diagnostics captured by one physics step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionDebugFrame {
    /// Number of frames published so far, this one included
    pub frame: u64,
    /// Contact points found by the narrow phase this step
    pub contact_points: Vec<Vec3>,
    /// Collider bounds of entities flagged [`DebugFlags::SHOW_COLLIDERS`]
    pub collider_bounds: Vec<(Entity, Aabb)>,
    /// Occupied chunk bounds of entities flagged [`DebugFlags::SHOW_CHUNKS`]
    pub chunk_cells: Vec<(Entity, Aabb)>,
}

impl CollisionDebugFrame {
    /// Whether the frame carries no diagnostics
    pub fn is_empty(&self) -> bool {
        self.contact_points.is_empty() && self.collider_bounds.is_empty() && self.chunk_cells.is_empty()
    }
}

#[derive(Debug, Default)]
struct DebugState {
    enabled: bool,
    entity_flags: HashMap<Entity, DebugFlags>,
    current: CollisionDebugFrame,
}

/// Shared handle to collision diagnostics
///
/// Cloning is cheap; all clones see the same state.
#[derive(Debug, Clone)]
pub struct CollisionDebugSink {
    state: Arc<RwLock<DebugState>>,
}

impl Default for CollisionDebugSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionDebugSink {
    /// Create an enabled sink with no entity flags
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(DebugState {
                enabled: true,
                ..Default::default()
            })),
        }
    }

    // A panic while holding the lock leaves plain data behind; keep using it.
    fn read(&self) -> RwLockReadGuard<'_, DebugState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DebugState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the step should collect diagnostics
    pub fn is_enabled(&self) -> bool {
        self.read().enabled
    }

    /// Turn collection on or off
    pub fn set_enabled(&self, enabled: bool) {
        self.write().enabled = enabled;
    }

    /// Display options for an entity
    pub fn flags(&self, entity: Entity) -> DebugFlags {
        self.read().entity_flags.get(&entity).copied().unwrap_or_default()
    }

    /// Replace an entity's display options; empty flags forget the entity
    pub fn set_flags(&self, entity: Entity, flags: DebugFlags) {
        let mut state = self.write();
        if flags.is_empty() {
            state.entity_flags.remove(&entity);
        } else {
            state.entity_flags.insert(entity, flags);
        }
    }

    /// Add display options to an entity
    pub fn insert_flags(&self, entity: Entity, flags: DebugFlags) {
        let mut state = self.write();
        state.entity_flags.entry(entity).or_default().insert(flags);
    }

    /// Forget an entity's display options
    pub fn clear_flags(&self, entity: Entity) {
        self.write().entity_flags.remove(&entity);
    }

    /// Every entity with non-empty display options
    pub fn flagged_entities(&self) -> Vec<(Entity, DebugFlags)> {
        let mut flagged: Vec<_> = self.read().entity_flags.iter().map(|(&e, &f)| (e, f)).collect();
        flagged.sort_unstable_by_key(|&(entity, _)| entity);
        flagged
    }

    /// Copy of the most recently published frame
    pub fn snapshot(&self) -> CollisionDebugFrame {
        self.read().current.clone()
    }

    /// Inspect the most recently published frame under the read lock
    pub fn with_frame<R>(&self, f: impl FnOnce(&CollisionDebugFrame) -> R) -> R {
        f(&self.read().current)
    }

    /// Number of frames published so far
    pub fn frame_count(&self) -> u64 {
        self.read().current.frame
    }

    /// Replace the current frame, stamping it with the next frame number
    pub(crate) fn publish(&self, mut frame: CollisionDebugFrame) {
        let mut state = self.write();
        frame.frame = state.current.frame + 1;
        state.current = frame;
    }
}
