//! Rigid-body physics
//!
//! Force-accumulation integration, chunk-indexed broad phase, collider-pair
//! narrow phase and block-and-revert collision response.

pub mod collision;
pub mod collision_system;
pub mod error;
pub mod physics_system;

#[cfg(test)]
mod tests;

pub use collision_system::{CollisionDetector, CollisionEvent, CollisionReport};
pub use error::PhysicsError;
pub use physics_system::{PhysicsSystem, StepStats};
