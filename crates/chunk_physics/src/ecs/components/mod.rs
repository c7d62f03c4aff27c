//! ECS Components module
//!
//! Components the physics system reads and writes.

pub mod transform;
pub mod rigid_body;

pub use transform::TransformComponent;
pub use rigid_body::{ForceMode, RigidBody};
