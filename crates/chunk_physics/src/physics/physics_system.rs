//! Per-frame physics driver
//!
//! Each step walks every rigid body once. Awake dynamic bodies fold gravity
//! and queued forces into velocity, move tentatively, and are tested against
//! their chunk neighbours; a hit puts the body back where it was and stops
//! it dead. Index membership is refreshed afterwards either way.
//!
//! Sleeping bodies are skipped entirely. Kinematic bodies are never
//! integrated but are re-indexed so they block from wherever they were moved.
//!
//! Before any body moves, the index is reconciled with the world: entries
//! whose rigid body is gone are dropped (waking their neighbours) and bodies
//! that were never registered are added.

use std::path::Path;

use crate::config::{Config, PhysicsConfig};
use crate::debug::{CollisionDebugFrame, CollisionDebugSink, DebugFlags};
use crate::ecs::components::{ForceMode, RigidBody, TransformComponent};
use crate::ecs::{Entity, World};
use crate::foundation::math::{integrate_rotation, Vec3};
use crate::foundation::time::Timer;
use crate::physics::collision::Aabb;
use crate::physics::{CollisionDetector, PhysicsError};
use crate::spatial::{ChunkIndex, SpatialQuery};

/// What one step did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepStats {
    /// Seconds simulated
    pub delta_time: f32,
    /// Bodies that were integrated (awake and dynamic)
    pub integrated_bodies: usize,
    /// Bodies whose move was blocked
    pub collisions: usize,
    /// Contact points gathered for diagnostics
    pub contact_points: usize,
}

/// Rigid-body stepper owning the chunk index
#[derive(Debug)]
pub struct PhysicsSystem {
    config: PhysicsConfig,
    chunks: ChunkIndex,
    detector: CollisionDetector,
    timer: Timer,
    debug_sink: Option<CollisionDebugSink>,
    last_stats: StepStats,
}

impl Default for PhysicsSystem {
    fn default() -> Self {
        Self::with_valid_config(PhysicsConfig::default())
    }
}

impl PhysicsSystem {
    /// Create a physics system after validating `config`
    pub fn new(config: PhysicsConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    /// Load a `.toml` or `.ron` config file and create a physics system from it
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, PhysicsError> {
        let config = PhysicsConfig::load_from_file(path)?;
        Self::new(config)
    }

    fn with_valid_config(config: PhysicsConfig) -> Self {
        log::debug!(
            "Physics system: gravity {}, sleep threshold {}, chunk size {:?}",
            config.gravity_constant,
            config.sleep_threshold,
            config.chunk_size
        );
        Self {
            chunks: ChunkIndex::new(config.chunk_size),
            config,
            detector: CollisionDetector::new(),
            timer: Timer::new(),
            debug_sink: None,
            last_stats: StepStats::default(),
        }
    }

    /// Builder pattern: Publish per-step diagnostics into `sink`
    pub fn with_debug_sink(mut self, sink: CollisionDebugSink) -> Self {
        self.debug_sink = Some(sink);
        self
    }

    /// Attach or detach the diagnostics sink
    pub fn set_debug_sink(&mut self, sink: Option<CollisionDebugSink>) {
        self.debug_sink = sink;
    }

    /// Diagnostics sink, if attached
    pub fn debug_sink(&self) -> Option<&CollisionDebugSink> {
        self.debug_sink.as_ref()
    }

    /// Active configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// The broad-phase index
    pub fn chunk_index(&self) -> &ChunkIndex {
        &self.chunks
    }

    /// Frame timer driving [`PhysicsSystem::step`]
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Statistics of the most recent step
    pub fn last_stats(&self) -> StepStats {
        self.last_stats
    }

    // ---- entity lifecycle -------------------------------------------------

    /// Register an entity's body with the index
    ///
    /// Returns `false` if the entity has no body, no transform or no colliders.
    pub fn add_entity(&mut self, world: &World, entity: Entity) -> bool {
        let Some(bounds) = entity_bounds(world, entity) else {
            log::trace!("Entity {:?} has nothing to index", entity);
            return false;
        };
        self.chunks.insert(entity, &bounds);
        true
    }

    /// Register every entity carrying a rigid body; returns how many were indexed
    pub fn add_all(&mut self, world: &World) -> usize {
        world
            .entities_with::<RigidBody>()
            .into_iter()
            .filter(|&entity| self.add_entity(world, entity))
            .count()
    }

    /// Bring an entity's index membership in line with its current bounds
    ///
    /// Call after moving an entity or changing its colliders outside a step.
    /// Returns `true` if membership changed.
    pub fn refresh_entity(&mut self, world: &World, entity: Entity) -> bool {
        match entity_bounds(world, entity) {
            Some(bounds) => self.chunks.update(entity, &bounds),
            None if self.chunks.contains(entity) => {
                self.chunks.remove(entity);
                true
            }
            None => false,
        }
    }

    /// Drop an entity from the index and wake everything it shared a chunk with
    ///
    /// Returns the woken neighbours.
    pub fn remove_entity(&mut self, world: &mut World, entity: Entity) -> Vec<Entity> {
        let neighbours = self.chunks.remove(entity);
        for &neighbour in &neighbours {
            if let Some(body) = world.get_component_mut::<RigidBody>(neighbour) {
                if body.is_sleeping() {
                    log::debug!("Waking {:?} after {:?} left its chunk", neighbour, entity);
                }
                body.set_sleeping(false);
            }
        }
        if let Some(sink) = &self.debug_sink {
            sink.clear_flags(entity);
        }
        neighbours
    }

    /// [`PhysicsSystem::remove_entity`] followed by despawning the entity
    pub fn despawn(&mut self, world: &mut World, entity: Entity) -> bool {
        self.remove_entity(world, entity);
        world.despawn(entity)
    }

    /// Apply a force at a world-space point, using the entity's position as the lever origin
    pub fn apply_force_at(
        &self,
        world: &mut World,
        entity: Entity,
        force: Vec3,
        point: Vec3,
        mode: ForceMode,
    ) -> Result<(), PhysicsError> {
        let origin = world
            .get_component::<TransformComponent>(entity)
            .map(|transform| transform.position)
            .ok_or_else(|| PhysicsError::missing::<TransformComponent>(entity))?;
        let body = world
            .get_component_mut::<RigidBody>(entity)
            .ok_or_else(|| PhysicsError::missing::<RigidBody>(entity))?;

        body.apply_force_at(force, point, origin, mode);
        Ok(())
    }

    // ---- stepping ---------------------------------------------------------

    /// Advance by the wall-clock time since the previous step
    pub fn step(&mut self, world: &mut World) -> StepStats {
        let delta_time = self.timer.tick();
        self.advance(world, delta_time)
    }

    /// Advance by an explicit `delta_time` in seconds
    pub fn step_with_delta(&mut self, world: &mut World, delta_time: f32) -> StepStats {
        self.timer.record(delta_time);
        self.timer.reset_clock();
        self.advance(world, delta_time)
    }

    fn advance(&mut self, world: &mut World, delta_time: f32) -> StepStats {
        self.reconcile(world);

        let collect_points = self.debug_sink.as_ref().is_some_and(CollisionDebugSink::is_enabled);
        let mut contacts = Vec::new();
        let mut stats = StepStats {
            delta_time,
            ..Default::default()
        };

        for entity in world.entities_with::<RigidBody>() {
            let Some(body) = world.get_component::<RigidBody>(entity) else {
                continue;
            };
            if body.is_kinematic() {
                self.refresh_entity(world, entity);
                continue;
            }
            if body.is_sleeping() {
                continue;
            }
            if !world.has_component::<TransformComponent>(entity) {
                log::trace!("Skipping {:?}: no transform", entity);
                continue;
            }

            self.step_body(world, entity, delta_time, collect_points, &mut contacts, &mut stats);
        }

        stats.contact_points = contacts.len();
        self.publish_debug(world, contacts);
        self.last_stats = stats;

        log::trace!(
            "Physics step {:.4}s: {} integrated, {} blocked",
            delta_time,
            stats.integrated_bodies,
            stats.collisions
        );
        stats
    }

    fn reconcile(&mut self, world: &mut World) {
        let mut stale: Vec<Entity> = self
            .chunks
            .indexed_entities()
            .filter(|&entity| !world.has_component::<RigidBody>(entity))
            .collect();
        stale.sort_unstable();
        for entity in stale {
            log::debug!("Dropping {:?} from the index: rigid body is gone", entity);
            self.remove_entity(world, entity);
        }

        for entity in world.entities_with::<RigidBody>() {
            if !self.chunks.contains(entity) {
                self.add_entity(world, entity);
            }
        }
    }

    fn step_body(
        &mut self,
        world: &mut World,
        entity: Entity,
        delta_time: f32,
        collect_points: bool,
        contacts: &mut Vec<Vec3>,
        stats: &mut StepStats,
    ) {
        let Some(body) = world.get_component_mut::<RigidBody>(entity) else {
            return;
        };
        body.integrate(self.config.gravity_constant, self.config.sleep_threshold, delta_time);
        let velocity = body.velocity();
        let angular_velocity = body.angular_velocity();

        let Some(transform) = world.get_component_mut::<TransformComponent>(entity) else {
            return;
        };
        let previous_position = transform.position;
        let previous_rotation = transform.rotation;
        transform.position += velocity * delta_time;
        transform.rotation = integrate_rotation(&transform.rotation, &angular_velocity, delta_time);
        stats.integrated_bodies += 1;

        let report = self.detector.detect(world, entity, &self.chunks, collect_points);
        if report.collided {
            stats.collisions += 1;
            contacts.extend_from_slice(&report.contact_points);

            if let Some(transform) = world.get_component_mut::<TransformComponent>(entity) {
                transform.position = previous_position;
                transform.rotation = previous_rotation;
            }

            let event = report.into_event(entity);
            log::trace!("{:?} blocked by {:?}", entity, event.others);
            if let Some(body) = world.get_component_mut::<RigidBody>(entity) {
                body.stop();
                body.notify_collision(&event);
            }
        }

        self.refresh_entity(world, entity);
    }

    fn publish_debug(&self, world: &World, contacts: Vec<Vec3>) {
        let Some(sink) = &self.debug_sink else {
            return;
        };
        if !sink.is_enabled() {
            sink.publish(CollisionDebugFrame::default());
            return;
        }

        let mut frame = CollisionDebugFrame {
            contact_points: contacts,
            ..Default::default()
        };

        for (entity, flags) in sink.flagged_entities() {
            if flags.contains(DebugFlags::SHOW_COLLIDERS) {
                if let (Some(body), Some(transform)) = (
                    world.get_component::<RigidBody>(entity),
                    world.get_component::<TransformComponent>(entity),
                ) {
                    frame
                        .collider_bounds
                        .extend(body.colliders().map(|collider| (entity, collider.bounds(transform))));
                }
            }
            if flags.contains(DebugFlags::SHOW_CHUNKS) {
                if let Some(range) = self.chunks.cached_range(entity) {
                    frame
                        .chunk_cells
                        .extend(range.cells().map(|coord| (entity, self.chunks.cell_bounds(coord))));
                }
            }
        }

        sink.publish(frame);
    }
}

fn entity_bounds(world: &World, entity: Entity) -> Option<Aabb> {
    let body = world.get_component::<RigidBody>(entity)?;
    let transform = world.get_component::<TransformComponent>(entity)?;
    body.bounds(transform)
}
