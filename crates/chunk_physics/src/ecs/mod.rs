//! Entity-Component-System implementation
//!
//! Minimal entity/component store consumed by the physics system.

pub mod world;
pub mod entity;
pub mod component;
pub mod components;

pub use world::World;
pub use entity::Entity;
pub use component::Component;
