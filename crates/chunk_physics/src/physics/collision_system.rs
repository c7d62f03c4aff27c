//! Collision detection for a single moved body
//!
//! Two phases, as usual: the broad phase asks the spatial index which
//! entities share a chunk with the body's bounds, the narrow phase runs
//! every collider pair through
//! [`Collider::collide`](crate::physics::collision::Collider::collide). The outcome is a yes/no
//! decision for the body; contact points are only gathered for diagnostics.

use crate::ecs::components::{RigidBody, TransformComponent};
use crate::ecs::{Entity, World};
use crate::foundation::math::Vec3;
use crate::physics::collision::Aabb;
use crate::spatial::SpatialQuery;

/// Delivered to a body's `on_collision` callback when a step blocks it
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    /// The body that was blocked
    pub entity: Entity,
    /// Entities it collided with, in entity order
    pub others: Vec<Entity>,
    /// Contact points (empty unless debug contact collection is on)
    pub points: Vec<Vec3>,
}

/// Result of testing one body against its neighbourhood
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Whether any collider pair touched
    pub collided: bool,
    /// Entities with at least one touching collider pair, in entity order
    pub hits: Vec<Entity>,
    /// Contact points from every touching pair, when collection was requested
    pub contact_points: Vec<Vec3>,
}

impl CollisionReport {
    /// Turn a positive report into the event handed to callbacks
    pub fn into_event(self, entity: Entity) -> CollisionEvent {
        CollisionEvent {
            entity,
            others: self.hits,
            points: self.contact_points,
        }
    }
}

/// Broad-phase plus narrow-phase test for one body at its current pose
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionDetector;

impl CollisionDetector {
    /// Create a detector
    pub fn new() -> Self {
        Self
    }

    /// Test `entity` at its current transform against every indexed neighbour
    ///
    /// Entities without a body, a transform or colliders never collide.
    pub fn detect(
        &self,
        world: &World,
        entity: Entity,
        spatial: &dyn SpatialQuery,
        collect_points: bool,
    ) -> CollisionReport {
        let (Some(body), Some(transform)) = (
            world.get_component::<RigidBody>(entity),
            world.get_component::<TransformComponent>(entity),
        ) else {
            return CollisionReport::default();
        };
        let Some(bounds) = body.bounds(transform) else {
            return CollisionReport::default();
        };

        let candidates = self.broad_phase(entity, &bounds, spatial);
        self.narrow_phase(world, body, transform, &candidates, collect_points)
    }

    /// Entities sharing a chunk with `bounds`, excluding `entity`, in entity order
    pub fn broad_phase(&self, entity: Entity, bounds: &Aabb, spatial: &dyn SpatialQuery) -> Vec<Entity> {
        let mut candidates: Vec<Entity> = spatial
            .query_aabb(bounds)
            .into_iter()
            .filter(|&candidate| candidate != entity)
            .collect();
        candidates.sort_unstable();
        candidates
    }

    fn narrow_phase(
        &self,
        world: &World,
        body: &RigidBody,
        transform: &TransformComponent,
        candidates: &[Entity],
        collect_points: bool,
    ) -> CollisionReport {
        let mut report = CollisionReport::default();

        for &candidate in candidates {
            let (Some(other_body), Some(other_transform)) = (
                world.get_component::<RigidBody>(candidate),
                world.get_component::<TransformComponent>(candidate),
            ) else {
                continue;
            };

            if test_pairs(body, transform, other_body, other_transform, collect_points, &mut report.contact_points) {
                report.hits.push(candidate);
            }
        }

        report.collided = !report.hits.is_empty();
        report
    }
}

fn test_pairs(
    body: &RigidBody,
    transform: &TransformComponent,
    other: &RigidBody,
    other_transform: &TransformComponent,
    collect_points: bool,
    points: &mut Vec<Vec3>,
) -> bool {
    let mut hit = false;
    for collider in body.colliders() {
        for other_collider in other.colliders() {
            let result = collider.collide(transform, other_collider, other_transform);
            if !result.collided {
                continue;
            }
            hit = true;
            if !collect_points {
                return true;
            }
            points.extend(result.collision_points);
        }
    }
    hit
}
