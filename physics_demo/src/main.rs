//! Drop demo
//!
//! Stacks a handful of crates and balls above a kinematic floor and steps
//! the simulation at a fixed rate until everything has come to rest.
//!
//! Usage: `drop_demo [config.toml|config.ron]`

use chunk_physics::foundation::logging;
use chunk_physics::prelude::*;

const FIXED_DELTA: f32 = 1.0 / 60.0;
const MAX_STEPS: usize = 600;

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),
}

fn load_physics() -> Result<PhysicsSystem, DemoError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading physics config from {}", path);
            Ok(PhysicsSystem::from_config_file(path)?)
        }
        None => Ok(PhysicsSystem::new(PhysicsConfig::default())?),
    }
}

fn spawn_scene(world: &mut World) -> Result<Vec<Entity>, DemoError> {
    let floor = world.create_entity();
    world.add_component(floor, TransformComponent::from_position(Vec3::new(0.0, -0.5, 0.0)));
    world.add_component(
        floor,
        RigidBody::kinematic().with_collider(CollisionShape::cuboid(Vec3::new(8.0, 0.5, 8.0))),
    );

    let mut bodies = Vec::new();
    for i in 0..6u8 {
        let x = f32::from(i % 3) * 2.0 - 2.0;
        let height = 3.0 + f32::from(i) * 1.5;
        let shape = if i % 2 == 0 {
            CollisionShape::unit_cube()
        } else {
            CollisionShape::sphere(0.5)
        };

        let entity = world.create_entity();
        world.add_component(entity, TransformComponent::from_position(Vec3::new(x, height, 0.0)));
        world.add_component(
            entity,
            RigidBody::new().with_mass(1.0 + f32::from(i))?.with_collider(shape),
        );
        bodies.push(entity);
    }

    Ok(bodies)
}

fn run() -> Result<(), DemoError> {
    let sink = CollisionDebugSink::new();
    let mut physics = load_physics()?.with_debug_sink(sink.clone());
    let mut world = World::new();

    let bodies = spawn_scene(&mut world)?;
    let indexed = physics.add_all(&world);
    log::info!("Indexed {} bodies over {} chunk(s)", indexed, physics.chunk_index().cell_count());

    if let Some(&first) = bodies.first() {
        sink.insert_flags(first, DebugFlags::SHOW_CHUNKS);
    }

    let mut resting_steps = 0;
    for step in 0..MAX_STEPS {
        let stats = physics.step_with_delta(&mut world, FIXED_DELTA);

        if stats.collisions > 0 {
            log::debug!(
                "Step {}: {} blocked, {} contact point(s)",
                step,
                stats.collisions,
                stats.contact_points
            );
        }

        let moving = bodies
            .iter()
            .filter_map(|&entity| world.get_component::<RigidBody>(entity))
            .filter(|body| body.velocity().magnitude() > 0.0)
            .count();
        if moving == 0 {
            resting_steps += 1;
        } else {
            resting_steps = 0;
        }

        if step % 60 == 0 {
            log::info!(
                "t={:.2}s integrated={} moving={} chunks={}",
                physics.timer().total_time(),
                stats.integrated_bodies,
                moving,
                physics.chunk_index().cell_count()
            );
        }

        if resting_steps >= 30 {
            log::info!("Scene at rest after {} steps", step + 1);
            break;
        }
    }

    for &entity in &bodies {
        if let Some(transform) = world.get_component::<TransformComponent>(entity) {
            log::info!("{:?} came to rest at {:?}", entity, transform.position);
        }
    }
    log::info!(
        "Last debug frame #{} tracked {} chunk cell(s)",
        sink.frame_count(),
        sink.with_frame(|frame| frame.chunk_cells.len())
    );

    Ok(())
}

fn main() {
    logging::init_with_default("info");
    log::info!("Starting chunk physics drop demo");

    if let Err(e) = run() {
        log::error!("Drop demo failed: {}", e);
        std::process::exit(1);
    }
}
