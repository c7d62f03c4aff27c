//! Debug diagnostics shared between the physics step and visualization tools

pub mod collision_debug;

pub use collision_debug::{CollisionDebugFrame, CollisionDebugSink, DebugFlags};
