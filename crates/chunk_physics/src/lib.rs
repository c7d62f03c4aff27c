//! # Chunk Physics
//!
//! Rigid-body physics with a chunked broad phase, meant to be embedded in an
//! entity-component game engine.
//!
//! ## Features
//!
//! - **Force Accumulation**: forces, accelerations, impulses and velocity changes
//! - **Chunked Broad Phase**: sparse grid index updated differentially as bodies move
//! - **Block-and-Revert Response**: a blocked body returns to its previous pose and stops
//! - **Sleep/Wake**: resting bodies cost nothing until something disturbs them
//! - **Debug Diagnostics**: contact points and chunk occupancy behind a shared sink
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chunk_physics::prelude::*;
//!
//! fn main() -> Result<(), PhysicsError> {
//!     let mut world = World::new();
//!     let mut physics = PhysicsSystem::new(PhysicsConfig::default())?;
//!
//!     let crate_entity = world.create_entity();
//!     world.add_component(crate_entity, TransformComponent::from_position(Vec3::new(0.0, 5.0, 0.0)));
//!     world.add_component(
//!         crate_entity,
//!         RigidBody::new().with_mass(2.0)?.with_collider(CollisionShape::unit_cube()),
//!     );
//!     physics.add_entity(&world, crate_entity);
//!
//!     let stats = physics.step_with_delta(&mut world, 1.0 / 60.0);
//!     println!("integrated {} bodies", stats.integrated_bodies);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod ecs;
pub mod physics;
pub mod spatial;
pub mod debug;

/// Common imports for physics users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PhysicsConfig},
        debug::{CollisionDebugFrame, CollisionDebugSink, DebugFlags},
        ecs::{
            components::{ForceMode, RigidBody, TransformComponent},
            Component, Entity, World,
        },
        foundation::math::{Quat, Vec3},
        physics::{
            collision::{Aabb, Collider, CollisionResult, CollisionShape},
            CollisionEvent, PhysicsError, PhysicsSystem, StepStats,
        },
        spatial::{ChunkCoord, ChunkIndex, SpatialQuery},
    };
}
