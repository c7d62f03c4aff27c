use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use approx::assert_relative_eq;

use super::{body, crate_body, floor, position, spawn};
use crate::config::PhysicsConfig;
use crate::debug::{CollisionDebugSink, DebugFlags};
use crate::ecs::components::{ForceMode, RigidBody, TransformComponent};
use crate::ecs::World;
use crate::foundation::math::Vec3;
use crate::physics::collision::CollisionShape;
use crate::physics::{CollisionEvent, PhysicsSystem};
use crate::spatial::SpatialQuery;

fn physics() -> PhysicsSystem {
    PhysicsSystem::new(PhysicsConfig::default()).unwrap()
}

#[test]
fn test_free_fall_single_step() {
    let mut world = World::new();
    let mut physics = physics();
    let entity = spawn(&mut world, Vec3::zeros(), crate_body().with_mass(2.0).unwrap());
    physics.add_all(&world);

    let stats = physics.step_with_delta(&mut world, 1.0);

    assert_eq!(stats.integrated_bodies, 1);
    assert_eq!(stats.collisions, 0);
    assert_relative_eq!(body(&world, entity).velocity(), Vec3::new(0.0, -9.81, 0.0));
    assert_relative_eq!(position(&world, entity), Vec3::new(0.0, -9.81, 0.0));
    assert_eq!(body(&world, entity).force(), Vec3::zeros());
}

#[test]
fn test_blocked_step_reverts_and_stops() {
    let mut world = World::new();
    let mut physics = physics();
    let entity = spawn(&mut world, Vec3::zeros(), crate_body().with_mass(2.0).unwrap());
    floor(&mut world, -5.0);
    physics.add_all(&world);

    let stats = physics.step_with_delta(&mut world, 1.0);

    assert_eq!(stats.collisions, 1);
    assert_eq!(position(&world, entity), Vec3::zeros());
    assert_eq!(body(&world, entity).velocity(), Vec3::zeros());
    assert_eq!(body(&world, entity).angular_velocity(), Vec3::zeros());
}

#[test]
fn test_on_collision_reports_blocker() {
    let mut world = World::new();
    let mut physics = physics();
    let events: Arc<Mutex<Vec<CollisionEvent>>> = Arc::default();
    let sink = Arc::clone(&events);

    let mut falling = crate_body();
    falling.set_on_collision(move |event| sink.lock().unwrap().push(event.clone()));
    let entity = spawn(&mut world, Vec3::zeros(), falling);
    let ground = floor(&mut world, -5.0);
    physics.add_all(&world);

    physics.step_with_delta(&mut world, 1.0);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].entity, entity);
    assert_eq!(events[0].others, vec![ground]);
}

#[test]
fn test_dead_band_drops_small_acceleration() {
    let mut world = World::new();
    let mut physics = PhysicsSystem::new(PhysicsConfig::default().with_sleep_threshold(20.0)).unwrap();
    let entity = spawn(&mut world, Vec3::zeros(), crate_body());

    physics.step_with_delta(&mut world, 1.0);

    assert_eq!(body(&world, entity).velocity(), Vec3::zeros());
    assert_eq!(position(&world, entity), Vec3::zeros());
}

#[test]
fn test_gravity_off_never_accumulates_force() {
    let mut world = World::new();
    let mut physics = physics();
    let entity = spawn(&mut world, Vec3::zeros(), crate_body().with_gravity(false));

    for _ in 0..5 {
        physics.step_with_delta(&mut world, 0.1);
        assert_eq!(body(&world, entity).force(), Vec3::zeros());
    }
    assert_eq!(body(&world, entity).velocity(), Vec3::zeros());
    assert_eq!(position(&world, entity), Vec3::zeros());
}

#[test]
fn test_impulse_then_step_moves_body() {
    let mut world = World::new();
    let mut physics = physics();
    let entity = spawn(&mut world, Vec3::zeros(), crate_body().with_gravity(false).with_mass(2.0).unwrap());

    world
        .get_component_mut::<RigidBody>(entity)
        .unwrap()
        .apply_force(Vec3::new(0.0, 2.0, 0.0), ForceMode::Impulse);
    assert_eq!(body(&world, entity).velocity(), Vec3::new(0.0, 1.0, 0.0));

    physics.step_with_delta(&mut world, 0.5);
    assert_relative_eq!(position(&world, entity), Vec3::new(0.0, 0.5, 0.0));
}

#[test]
fn test_kinematic_body_never_moves() {
    let mut world = World::new();
    let mut physics = physics();
    let entity = spawn(
        &mut world,
        Vec3::new(3.0, 0.0, 0.0),
        RigidBody::kinematic()
            .with_collider(CollisionShape::unit_cube())
            .with_velocity(Vec3::new(1.0, 0.0, 0.0)),
    );
    world
        .get_component_mut::<RigidBody>(entity)
        .unwrap()
        .apply_force(Vec3::new(0.0, 100.0, 0.0), ForceMode::Force);

    for _ in 0..3 {
        let stats = physics.step_with_delta(&mut world, 1.0);
        assert_eq!(stats.integrated_bodies, 0);
    }

    assert_eq!(position(&world, entity), Vec3::new(3.0, 0.0, 0.0));
    assert_eq!(body(&world, entity).velocity(), Vec3::new(1.0, 0.0, 0.0));
    assert!(physics.chunk_index().contains(entity));
}

#[test]
fn test_kinematic_body_blocks_dynamic_body() {
    let mut world = World::new();
    let mut physics = physics();
    let mover = spawn(
        &mut world,
        Vec3::zeros(),
        crate_body().with_gravity(false).with_velocity(Vec3::new(5.0, 0.0, 0.0)),
    );
    let wall = spawn(
        &mut world,
        Vec3::new(1.2, 0.0, 0.0),
        RigidBody::kinematic().with_collider(CollisionShape::unit_cube()),
    );
    physics.add_all(&world);

    let stats = physics.step_with_delta(&mut world, 0.1);

    assert_eq!(stats.collisions, 1);
    assert_eq!(position(&world, mover), Vec3::zeros());
    assert_eq!(body(&world, mover).velocity(), Vec3::zeros());
    assert_eq!(position(&world, wall), Vec3::new(1.2, 0.0, 0.0));
}

#[test]
fn test_moved_kinematic_body_is_reindexed() {
    let mut world = World::new();
    let mut physics = physics();
    let wall = spawn(&mut world, Vec3::zeros(), RigidBody::kinematic().with_collider(CollisionShape::unit_cube()));
    physics.add_all(&world);

    world.get_component_mut::<TransformComponent>(wall).unwrap().position = Vec3::new(50.0, 0.0, 0.0);
    physics.step_with_delta(&mut world, 0.1);

    let range = physics.chunk_index().cached_range(wall).unwrap();
    assert_eq!(range.min.x, 49);
    assert_eq!(range.max.x, 50);
}

#[test]
fn test_sleeping_body_is_skipped_but_still_blocks() {
    let mut world = World::new();
    let mut physics = physics();
    let sleeper = spawn(&mut world, Vec3::new(0.0, -1.05, 0.0), crate_body().asleep());
    let faller = spawn(&mut world, Vec3::zeros(), crate_body());
    physics.add_all(&world);

    let stats = physics.step_with_delta(&mut world, 0.1);

    assert_eq!(stats.integrated_bodies, 1);
    assert_eq!(stats.collisions, 1);
    assert_eq!(position(&world, sleeper), Vec3::new(0.0, -1.05, 0.0));
    assert_eq!(position(&world, faller), Vec3::zeros());
    assert!(body(&world, sleeper).is_sleeping());
}

#[test]
fn test_despawn_wakes_neighbours() {
    let mut world = World::new();
    let mut physics = physics();
    let woken = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&woken);

    let mut resting = crate_body().asleep();
    resting.set_on_wake(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let neighbour = spawn(&mut world, Vec3::zeros(), resting);
    let support = spawn(&mut world, Vec3::new(0.0, -0.9, 0.0), crate_body().asleep());
    physics.add_all(&world);

    assert!(physics.despawn(&mut world, support));

    assert!(!world.is_alive(support));
    assert!(!physics.chunk_index().contains(support));
    assert!(!body(&world, neighbour).is_sleeping());
    assert_eq!(woken.load(Ordering::SeqCst), 1);
}

#[test]
fn test_angular_velocity_rotates_body() {
    let mut world = World::new();
    let mut physics = physics();
    let entity = spawn(
        &mut world,
        Vec3::zeros(),
        crate_body().with_gravity(false),
    );
    world
        .get_component_mut::<RigidBody>(entity)
        .unwrap()
        .set_angular_velocity(Vec3::new(0.0, 1.0, 0.0));

    physics.step_with_delta(&mut world, 0.5);

    let rotation = world.get_component::<TransformComponent>(entity).unwrap().rotation;
    assert_relative_eq!(rotation.angle(), 0.5, epsilon = 1e-5);
}

#[test]
fn test_debug_sink_receives_frame() {
    let mut world = World::new();
    let sink = CollisionDebugSink::new();
    let mut physics = physics().with_debug_sink(sink.clone());
    let entity = spawn(&mut world, Vec3::zeros(), crate_body());
    floor(&mut world, -5.0);
    physics.add_all(&world);
    sink.insert_flags(entity, DebugFlags::SHOW_COLLIDERS | DebugFlags::SHOW_CHUNKS);

    let stats = physics.step_with_delta(&mut world, 1.0);

    let frame = sink.snapshot();
    assert_eq!(frame.frame, 1);
    assert!(!frame.contact_points.is_empty());
    assert_eq!(stats.contact_points, frame.contact_points.len());
    assert_eq!(frame.collider_bounds.len(), 1);
    assert_eq!(frame.collider_bounds[0].0, entity);

    let cells = physics.chunk_index().cached_range(entity).unwrap().cell_count();
    assert_eq!(frame.chunk_cells.len(), cells);
}

#[test]
fn test_disabled_debug_sink_publishes_empty_frame() {
    let mut world = World::new();
    let sink = CollisionDebugSink::new();
    sink.set_enabled(false);
    let mut physics = physics().with_debug_sink(sink.clone());
    spawn(&mut world, Vec3::zeros(), crate_body());
    floor(&mut world, -5.0);
    physics.add_all(&world);

    let stats = physics.step_with_delta(&mut world, 1.0);

    assert_eq!(stats.collisions, 1);
    assert_eq!(stats.contact_points, 0);
    let frame = sink.snapshot();
    assert_eq!(frame.frame, 1);
    assert!(frame.is_empty());
}

#[test]
fn test_entity_despawned_through_world_leaves_index() {
    let mut world = World::new();
    let mut physics = physics();
    let support = spawn(&mut world, Vec3::new(0.0, -0.9, 0.0), crate_body().asleep());
    let resting = spawn(&mut world, Vec3::zeros(), crate_body().asleep());
    physics.add_all(&world);

    assert!(world.despawn(support));
    physics.step_with_delta(&mut world, 0.1);

    assert!(!physics.chunk_index().contains(support));
    assert_eq!(physics.chunk_index().entity_count(), 1);
    assert!(!body(&world, resting).is_sleeping());
}

#[test]
fn test_removed_rigid_body_leaves_index() {
    let mut world = World::new();
    let mut physics = physics();
    let entity = spawn(&mut world, Vec3::zeros(), crate_body().asleep());
    physics.add_all(&world);

    assert!(world.remove_component::<RigidBody>(entity).is_some());
    physics.step_with_delta(&mut world, 0.1);

    assert!(world.is_alive(entity));
    assert!(physics.chunk_index().is_empty());
    assert_eq!(physics.chunk_index().cell_count(), 0);
}

#[test]
fn test_sleeping_body_spawned_late_is_indexed_and_blocks() {
    let mut world = World::new();
    let mut physics = physics();
    physics.add_all(&world);

    let sleeper = spawn(&mut world, Vec3::new(0.0, -1.05, 0.0), crate_body().asleep());
    let faller = spawn(&mut world, Vec3::zeros(), crate_body());

    let stats = physics.step_with_delta(&mut world, 0.1);

    assert!(physics.chunk_index().contains(sleeper));
    assert_eq!(stats.collisions, 1);
    assert_eq!(position(&world, faller), Vec3::zeros());
    assert!(body(&world, sleeper).is_sleeping());
}

#[test]
fn test_contacts_do_not_carry_over_to_next_frame() {
    let mut world = World::new();
    let sink = CollisionDebugSink::new();
    let mut physics = physics().with_debug_sink(sink.clone());
    spawn(&mut world, Vec3::zeros(), crate_body());
    let ground = floor(&mut world, -5.0);
    physics.add_all(&world);

    physics.step_with_delta(&mut world, 1.0);
    assert!(!sink.snapshot().contact_points.is_empty());

    assert!(physics.despawn(&mut world, ground));
    let stats = physics.step_with_delta(&mut world, 0.1);

    assert_eq!(stats.collisions, 0);
    let frame = sink.snapshot();
    assert_eq!(frame.frame, 2);
    assert!(frame.contact_points.is_empty());
}
