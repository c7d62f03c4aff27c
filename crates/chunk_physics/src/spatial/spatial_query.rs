//! Abstract spatial query interface for broad-phase collision detection
//!
//! The broad phase only has to answer "who could be touching this box?";
//! the collision detector depends on this trait, not on the chunk grid.

use std::any::Any;
use std::collections::HashSet;

use crate::ecs::Entity;
use crate::physics::collision::Aabb;

/// Abstract interface for spatial partitioning used in broad-phase collision detection
pub trait SpatialQuery: Send + Sync {
    /// Insert an entity covering `bounds`
    fn insert(&mut self, entity: Entity, bounds: &Aabb);

    /// Move an entity to new bounds, inserting it if unknown
    ///
    /// Returns `true` if the entity's cell membership changed.
    fn update(&mut self, entity: Entity, bounds: &Aabb) -> bool;

    /// Remove an entity
    ///
    /// Returns the other entities that shared a cell with it, sorted.
    fn remove(&mut self, entity: Entity) -> Vec<Entity>;

    /// Entities occupying any cell that `bounds` covers
    fn query_aabb(&self, bounds: &Aabb) -> HashSet<Entity>;

    /// Whether the entity is indexed
    fn contains(&self, entity: Entity) -> bool;

    /// Number of indexed entities
    fn entity_count(&self) -> usize;

    /// Clear all entities from the spatial structure
    fn clear(&mut self);

    /// Downcast to Any for type-specific access (e.g., ChunkIndex)
    fn as_any(&self) -> &dyn Any;

    /// Downcast to Any for mutable type-specific access
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
