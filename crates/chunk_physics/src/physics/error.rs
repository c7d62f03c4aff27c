//! Physics error types

use crate::config::ConfigError;
use crate::ecs::Entity;

/// Errors raised at the physics API boundary
#[derive(thiserror::Error, Debug)]
pub enum PhysicsError {
    /// Mass must be finite and strictly positive
    #[error("Invalid mass {0}: mass must be finite and greater than zero")]
    InvalidMass(f32),

    /// An operation needed a component the entity does not carry
    #[error("Entity {entity:?} has no {component}")]
    MissingComponent {
        /// The entity that was queried
        entity: Entity,
        /// Name of the missing component type
        component: &'static str,
    },

    /// Configuration failed validation or loading
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PhysicsError {
    pub(crate) fn missing<T>(entity: Entity) -> Self {
        Self::MissingComponent {
            entity,
            component: std::any::type_name::<T>(),
        }
    }
}
