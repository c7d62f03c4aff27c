//! Collider contract consumed by the collision detector
//!
//! A collider is geometry in the owning entity's model space. Every query
//! takes the owner's transform so nothing has to be re-synced when the
//! entity moves.

use std::fmt;

use super::primitives::Aabb;
use super::shape::WorldSpaceShape;
use crate::ecs::components::TransformComponent;
use crate::foundation::math::Vec3;

/// Outcome of one narrow-phase pair test
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionResult {
    /// Whether the two colliders touch or overlap
    pub collided: bool,
    /// World-space contact points (empty when not collided)
    pub collision_points: Vec<Vec3>,
}

impl CollisionResult {
    /// A miss
    pub fn none() -> Self {
        Self::default()
    }

    /// A hit with the given contact points
    pub fn hit(collision_points: Vec<Vec3>) -> Self {
        Self {
            collided: true,
            collision_points,
        }
    }
}

/// Geometry attached to a rigid body
///
/// Implementors only have to provide [`Collider::world_shape`]; every other
/// method has a default built on it. Custom geometry can override
/// [`Collider::collide`] to run its own narrow phase.
pub trait Collider: fmt::Debug + Send + Sync {
    /// World-space geometry when attached to `transform`
    fn world_shape(&self, transform: &TransformComponent) -> WorldSpaceShape;

    /// Minimum corner of the world-space bounds
    fn min(&self, transform: &TransformComponent) -> Vec3 {
        self.bounds(transform).min
    }

    /// Maximum corner of the world-space bounds
    fn max(&self, transform: &TransformComponent) -> Vec3 {
        self.bounds(transform).max
    }

    /// World-space center
    fn center(&self, transform: &TransformComponent) -> Vec3 {
        self.world_shape(transform).center()
    }

    /// World-space axis-aligned bounds
    fn bounds(&self, transform: &TransformComponent) -> Aabb {
        self.world_shape(transform).bounds()
    }

    /// Narrow-phase test against another collider
    fn collide(
        &self,
        transform: &TransformComponent,
        other: &dyn Collider,
        other_transform: &TransformComponent,
    ) -> CollisionResult {
        self.world_shape(transform)
            .collide(&other.world_shape(other_transform))
    }
}

/// World-space bounds of a collider set: the union of every collider's min/max
///
/// Returns `None` for an empty set.
pub fn union_bounds<'a, I>(colliders: I, transform: &TransformComponent) -> Option<Aabb>
where
    I: IntoIterator<Item = &'a dyn Collider>,
{
    colliders.into_iter().fold(None, |acc, collider| {
        let bounds = Aabb::new(collider.min(transform), collider.max(transform));
        Some(acc.map_or(bounds, |acc: Aabb| acc.union(&bounds)))
    })
}
