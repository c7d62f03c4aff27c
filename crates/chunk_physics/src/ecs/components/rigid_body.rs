//! Rigid body component
//!
//! Per-entity physical state under a force-accumulation model: forces and
//! torques queue up between steps, impulses and velocity changes apply
//! immediately. Inertia uses a point-mass approximation, so `mass` stands in
//! for the inertia tensor on the angular side.
//!
//! Every mutator that wakes by default comes as a pair: `op(..)` wakes a
//! sleeping body, `op_with(.., wake)` lets the caller opt out.

use std::fmt;

use crate::ecs::components::TransformComponent;
use crate::ecs::Component;
use crate::foundation::math::Vec3;
use crate::physics::collision::{union_bounds, Aabb, Collider};
use crate::physics::{CollisionEvent, PhysicsError};

/// How a vector passed to the force/torque API combines with mass and time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ForceMode {
    /// Raw force, accumulated and consumed by the next step (scaled by 1/mass)
    #[default]
    Force,
    /// Acceleration, accumulated as `v * mass` so the step reproduces it exactly
    Acceleration,
    /// Instant velocity change of `v / mass`, bypassing the accumulator
    Impulse,
    /// Instant, mass-independent velocity change of `v`
    VelocityChange,
}

type LifecycleCallback = Box<dyn FnMut() + Send + Sync>;
type CollisionCallback = Box<dyn FnMut(&CollisionEvent) + Send + Sync>;

/// Physical state of one entity
pub struct RigidBody {
    velocity: Vec3,
    angular_velocity: Vec3,
    force: Vec3,
    torque: Vec3,
    mass: f32,
    // Stored for completeness; collision response is block-and-revert and never reads it.
    bounciness: f32,
    sleeping: bool,
    kinematic: bool,
    gravity: bool,
    colliders: Vec<Box<dyn Collider>>,
    on_collision: Option<CollisionCallback>,
    on_sleep: Option<LifecycleCallback>,
    on_wake: Option<LifecycleCallback>,
    sleep_counter: u32,
}

impl Component for RigidBody {}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RigidBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RigidBody")
            .field("velocity", &self.velocity)
            .field("angular_velocity", &self.angular_velocity)
            .field("force", &self.force)
            .field("torque", &self.torque)
            .field("mass", &self.mass)
            .field("bounciness", &self.bounciness)
            .field("sleeping", &self.sleeping)
            .field("kinematic", &self.kinematic)
            .field("gravity", &self.gravity)
            .field("colliders", &self.colliders)
            .field("sleep_counter", &self.sleep_counter)
            .finish_non_exhaustive()
    }
}

fn validate_mass(mass: f32) -> Result<f32, PhysicsError> {
    if mass.is_finite() && mass > 0.0 {
        Ok(mass)
    } else {
        Err(PhysicsError::InvalidMass(mass))
    }
}

impl RigidBody {
    /// Awake dynamic body of mass 1 with gravity and no colliders
    pub fn new() -> Self {
        Self {
            velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            force: Vec3::zeros(),
            torque: Vec3::zeros(),
            mass: 1.0,
            bounciness: 0.0,
            sleeping: false,
            kinematic: false,
            gravity: true,
            colliders: Vec::new(),
            on_collision: None,
            on_sleep: None,
            on_wake: None,
            sleep_counter: 0,
        }
    }

    /// Kinematic body: collidable, never integrated
    pub fn kinematic() -> Self {
        Self::new().with_kinematic(true)
    }

    /// Builder pattern: Set mass (must be finite and > 0)
    pub fn with_mass(mut self, mass: f32) -> Result<Self, PhysicsError> {
        self.mass = validate_mass(mass)?;
        Ok(self)
    }

    /// Builder pattern: Enable or disable gravity
    pub fn with_gravity(mut self, gravity: bool) -> Self {
        self.gravity = gravity;
        self
    }

    /// Builder pattern: Make kinematic
    pub fn with_kinematic(mut self, kinematic: bool) -> Self {
        self.kinematic = kinematic;
        self
    }

    /// Builder pattern: Set bounciness
    pub fn with_bounciness(mut self, bounciness: f32) -> Self {
        self.set_bounciness(bounciness);
        self
    }

    /// Builder pattern: Set initial velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Builder pattern: Attach a collider
    pub fn with_collider(mut self, collider: impl Collider + 'static) -> Self {
        self.colliders.push(Box::new(collider));
        self
    }

    /// Builder pattern: Start asleep (no callbacks fire)
    pub fn asleep(mut self) -> Self {
        self.sleeping = true;
        self
    }

    // ---- velocity -------------------------------------------------------

    /// Linear velocity
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Replace the linear velocity, waking the body
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.set_velocity_with(velocity, true);
    }

    /// Replace the linear velocity
    pub fn set_velocity_with(&mut self, velocity: Vec3, wake: bool) {
        self.velocity = velocity;
        self.wake_if(wake);
    }

    /// Angular velocity (radians per second about each axis)
    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    /// Replace the angular velocity, waking the body
    pub fn set_angular_velocity(&mut self, angular_velocity: Vec3) {
        self.set_angular_velocity_with(angular_velocity, true);
    }

    /// Replace the angular velocity
    pub fn set_angular_velocity_with(&mut self, angular_velocity: Vec3, wake: bool) {
        self.angular_velocity = angular_velocity;
        self.wake_if(wake);
    }

    // ---- force / torque accumulators ------------------------------------

    /// Accumulated force waiting for the next step
    pub fn force(&self) -> Vec3 {
        self.force
    }

    /// Replace the force accumulator, waking the body
    pub fn set_force(&mut self, force: Vec3) {
        self.set_force_with(force, true);
    }

    /// Replace the force accumulator
    pub fn set_force_with(&mut self, force: Vec3, wake: bool) {
        self.force = force;
        self.wake_if(wake);
    }

    /// Accumulated torque waiting for the next step
    pub fn torque(&self) -> Vec3 {
        self.torque
    }

    /// Replace the torque accumulator, waking the body
    pub fn set_torque(&mut self, torque: Vec3) {
        self.set_torque_with(torque, true);
    }

    /// Replace the torque accumulator
    pub fn set_torque_with(&mut self, torque: Vec3, wake: bool) {
        self.torque = torque;
        self.wake_if(wake);
    }

    /// Apply a force in the given mode, waking the body
    pub fn apply_force(&mut self, force: Vec3, mode: ForceMode) {
        self.apply_force_with(force, mode, true);
    }

    /// Apply a force in the given mode
    pub fn apply_force_with(&mut self, force: Vec3, mode: ForceMode, wake: bool) {
        match mode {
            ForceMode::Force => self.force += force,
            ForceMode::Acceleration => self.force += force * self.mass,
            ForceMode::Impulse => self.velocity += force / self.mass,
            ForceMode::VelocityChange => self.velocity += force,
        }
        self.wake_if(wake);
    }

    /// Apply a torque in the given mode, waking the body
    pub fn apply_torque(&mut self, torque: Vec3, mode: ForceMode) {
        self.apply_torque_with(torque, mode, true);
    }

    /// Apply a torque in the given mode
    pub fn apply_torque_with(&mut self, torque: Vec3, mode: ForceMode, wake: bool) {
        match mode {
            ForceMode::Force => self.torque += torque,
            ForceMode::Acceleration => self.torque += torque * self.mass,
            ForceMode::Impulse => self.angular_velocity += torque / self.mass,
            ForceMode::VelocityChange => self.angular_velocity += torque,
        }
        self.wake_if(wake);
    }

    /// Apply a force at a world-space point, waking the body
    ///
    /// `origin` is the body's world position; see [`RigidBody::apply_force_at_with`].
    pub fn apply_force_at(&mut self, force: Vec3, point: Vec3, origin: Vec3, mode: ForceMode) {
        self.apply_force_at_with(force, point, origin, mode, true);
    }

    /// Apply a force at a world-space point
    ///
    /// The lever arm `point - origin` turns the force into a torque
    /// `(point - origin) × force`; both are applied with `mode`.
    pub fn apply_force_at_with(&mut self, force: Vec3, point: Vec3, origin: Vec3, mode: ForceMode, wake: bool) {
        let lever_arm = point - origin;
        let torque = lever_arm.cross(&force);
        self.apply_force_with(force, mode, wake);
        self.apply_torque_with(torque, mode, wake);
    }

    // ---- mass / material ------------------------------------------------

    /// Mass (always finite and > 0)
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Set mass, waking the body
    pub fn set_mass(&mut self, mass: f32) -> Result<(), PhysicsError> {
        self.set_mass_with(mass, true)
    }

    /// Set mass; rejects zero, negative and non-finite values and leaves the body untouched
    pub fn set_mass_with(&mut self, mass: f32, wake: bool) -> Result<(), PhysicsError> {
        self.mass = validate_mass(mass)?;
        self.wake_if(wake);
        Ok(())
    }

    /// Bounciness in [0, 1]
    pub fn bounciness(&self) -> f32 {
        self.bounciness
    }

    /// Set bounciness, clamped to [0, 1]
    pub fn set_bounciness(&mut self, bounciness: f32) {
        self.bounciness = if bounciness.is_nan() { 0.0 } else { bounciness.clamp(0.0, 1.0) };
    }

    // ---- flags ----------------------------------------------------------

    /// Whether gravity is applied during integration
    pub fn has_gravity(&self) -> bool {
        self.gravity
    }

    /// Enable or disable gravity, waking the body
    pub fn set_gravity(&mut self, gravity: bool) {
        self.set_gravity_with(gravity, true);
    }

    /// Enable or disable gravity
    pub fn set_gravity_with(&mut self, gravity: bool, wake: bool) {
        self.gravity = gravity;
        self.wake_if(wake);
    }

    /// Whether the body is kinematic
    pub fn is_kinematic(&self) -> bool {
        self.kinematic
    }

    /// Kinematic bodies are never integrated but stay collidable
    pub fn set_kinematic(&mut self, kinematic: bool) {
        self.kinematic = kinematic;
    }

    /// Whether the body is asleep
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Change sleep state
    ///
    /// `on_sleep` fires only on an awake→asleep edge and `on_wake` only on an
    /// asleep→awake edge. The sleep counter resets on every call.
    pub fn set_sleeping(&mut self, sleeping: bool) {
        let was_sleeping = self.sleeping;
        self.sleeping = sleeping;
        self.sleep_counter = 0;

        match (was_sleeping, sleeping) {
            (false, true) => {
                if let Some(callback) = self.on_sleep.as_mut() {
                    callback();
                }
            }
            (true, false) => {
                if let Some(callback) = self.on_wake.as_mut() {
                    callback();
                }
            }
            _ => {}
        }
    }

    /// Wake the body (no-op if already awake apart from the counter reset)
    pub fn wake(&mut self) {
        self.set_sleeping(false);
    }

    /// Ticks counted toward sleeping; reset on every sleep-state change
    pub fn sleep_counter(&self) -> u32 {
        self.sleep_counter
    }

    /// Awake and dynamic: the only state the step integrates
    pub fn is_simulated(&self) -> bool {
        !self.sleeping && !self.kinematic
    }

    // ---- colliders ------------------------------------------------------

    /// Attached colliders in insertion order
    pub fn colliders(&self) -> impl ExactSizeIterator<Item = &dyn Collider> + '_ {
        self.colliders.iter().map(|collider| collider.as_ref())
    }

    /// Number of attached colliders
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Attach a collider, waking the body
    pub fn add_collider(&mut self, collider: impl Collider + 'static) {
        self.add_collider_with(collider, true);
    }

    /// Attach a collider
    pub fn add_collider_with(&mut self, collider: impl Collider + 'static, wake: bool) {
        self.colliders.push(Box::new(collider));
        self.wake_if(wake);
    }

    /// Detach the collider at `index`, waking the body
    pub fn remove_collider(&mut self, index: usize) -> Option<Box<dyn Collider>> {
        self.remove_collider_with(index, true)
    }

    /// Detach the collider at `index`
    pub fn remove_collider_with(&mut self, index: usize, wake: bool) -> Option<Box<dyn Collider>> {
        if index >= self.colliders.len() {
            return None;
        }
        let removed = self.colliders.remove(index);
        self.wake_if(wake);
        Some(removed)
    }

    /// Detach every collider, waking the body
    pub fn clear_colliders(&mut self) {
        self.clear_colliders_with(true);
    }

    /// Detach every collider
    pub fn clear_colliders_with(&mut self, wake: bool) {
        self.colliders.clear();
        self.wake_if(wake);
    }

    /// World-space bounds of all colliders, `None` without colliders
    pub fn bounds(&self, transform: &TransformComponent) -> Option<Aabb> {
        union_bounds(self.colliders(), transform)
    }

    // ---- callbacks ------------------------------------------------------

    /// Set the callback fired when a step blocks this body
    pub fn set_on_collision(&mut self, callback: impl FnMut(&CollisionEvent) + Send + Sync + 'static) {
        self.on_collision = Some(Box::new(callback));
    }

    /// Set the callback fired when the body falls asleep
    pub fn set_on_sleep(&mut self, callback: impl FnMut() + Send + Sync + 'static) {
        self.on_sleep = Some(Box::new(callback));
    }

    /// Set the callback fired when the body wakes up
    pub fn set_on_wake(&mut self, callback: impl FnMut() + Send + Sync + 'static) {
        self.on_wake = Some(Box::new(callback));
    }

    /// Remove every callback
    pub fn clear_callbacks(&mut self) {
        self.on_collision = None;
        self.on_sleep = None;
        self.on_wake = None;
    }

    // ---- step support ---------------------------------------------------

    /// Fold gravity and the accumulators into velocity for one step
    ///
    /// Accelerations whose magnitude does not exceed `sleep_threshold` are
    /// dropped so resting bodies settle instead of jittering. Accumulators
    /// are cleared either way.
    pub(crate) fn integrate(&mut self, gravity_constant: f32, sleep_threshold: f32, delta_time: f32) {
        if self.gravity {
            self.apply_force_with(
                Vec3::new(0.0, -gravity_constant * delta_time, 0.0),
                ForceMode::Acceleration,
                false,
            );
        }

        let acceleration = self.force / self.mass;
        if acceleration.magnitude() > sleep_threshold {
            self.velocity += acceleration;
        }
        self.force = Vec3::zeros();

        let angular_acceleration = self.torque / self.mass;
        if angular_acceleration.magnitude() > sleep_threshold {
            self.angular_velocity += angular_acceleration;
        }
        self.torque = Vec3::zeros();
    }

    /// Fully inelastic stop after a blocked move
    pub(crate) fn stop(&mut self) {
        self.velocity = Vec3::zeros();
        self.angular_velocity = Vec3::zeros();
    }

    pub(crate) fn notify_collision(&mut self, event: &CollisionEvent) {
        if let Some(callback) = self.on_collision.as_mut() {
            callback(event);
        }
    }

    fn wake_if(&mut self, wake: bool) {
        if wake {
            self.set_sleeping(false);
        }
    }
}
