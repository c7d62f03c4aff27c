//! Whole-step scenarios exercising the physics system, the chunk index and
//! the collision detector together

mod scenarios;

use crate::ecs::components::{RigidBody, TransformComponent};
use crate::ecs::{Entity, World};
use crate::foundation::math::Vec3;
use crate::physics::collision::CollisionShape;

pub(super) fn spawn(world: &mut World, position: Vec3, body: RigidBody) -> Entity {
    let entity = world.create_entity();
    world.add_component(entity, TransformComponent::from_position(position));
    world.add_component(entity, body);
    entity
}

pub(super) fn crate_body() -> RigidBody {
    RigidBody::new().with_collider(CollisionShape::unit_cube())
}

/// Kinematic slab whose top face sits at `top`
pub(super) fn floor(world: &mut World, top: f32) -> Entity {
    let half_extents = Vec3::new(10.0, 5.0, 10.0);
    spawn(
        world,
        Vec3::new(0.0, top - half_extents.y, 0.0),
        RigidBody::kinematic().with_collider(CollisionShape::cuboid(half_extents)),
    )
}

pub(super) fn position(world: &World, entity: Entity) -> Vec3 {
    world
        .get_component::<TransformComponent>(entity)
        .map(|transform| transform.position)
        .unwrap()
}

pub(super) fn body(world: &World, entity: Entity) -> &RigidBody {
    world.get_component::<RigidBody>(entity).unwrap()
}
