//! Collision geometry
//!
//! # Architecture
//!
//! - **Model Space Storage**: collision shapes are stored relative to the owning entity
//! - **On-Demand Transformation**: shapes move to world space only during tests
//!
//! # Module Organization
//!
//! - [`collider`] - The [`Collider`] contract the detector consumes
//! - [`primitives`] - World-space spheres and boxes
//! - [`shape`] - Reference model-space shapes implementing [`Collider`]

pub mod collider;
pub mod primitives;
pub mod shape;

pub use collider::{union_bounds, Collider, CollisionResult};
pub use primitives::{Aabb, BoundingSphere};
pub use shape::{CollisionShape, WorldSpaceShape};
