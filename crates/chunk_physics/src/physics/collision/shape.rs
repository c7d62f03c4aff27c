//! Reference collision shapes
//!
//! Shapes are stored in MODEL SPACE (relative to the owning entity's
//! transform) and moved into world space on demand during tests.

use super::collider::{Collider, CollisionResult};
use super::primitives::{Aabb, BoundingSphere};
use crate::ecs::components::TransformComponent;
use crate::foundation::math::Vec3;

/// Model-space collision shape attached to a rigid body
#[derive(Debug, Clone, PartialEq)]
pub enum CollisionShape {
    /// Sphere around `offset`
    Sphere {
        /// Center relative to the entity origin
        offset: Vec3,
        /// Radius before scaling
        radius: f32,
    },
    /// Axis-aligned box around `offset`
    ///
    /// Entity rotation moves the offset but never tilts the box.
    Cuboid {
        /// Center relative to the entity origin
        offset: Vec3,
        /// Half-size along each axis before scaling
        half_extents: Vec3,
    },
}

impl CollisionShape {
    /// Sphere centered on the entity origin
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere {
            offset: Vec3::zeros(),
            radius,
        }
    }

    /// Box centered on the entity origin
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::Cuboid {
            offset: Vec3::zeros(),
            half_extents,
        }
    }

    /// Box with edge length 1 centered on the entity origin
    pub fn unit_cube() -> Self {
        Self::cuboid(Vec3::new(0.5, 0.5, 0.5))
    }

    /// Builder pattern: Move the shape away from the entity origin
    pub fn with_offset(mut self, new_offset: Vec3) -> Self {
        match &mut self {
            Self::Sphere { offset, .. } | Self::Cuboid { offset, .. } => *offset = new_offset,
        }
        self
    }

    /// Transform this shape to world space using the owner's transform
    pub fn to_world_space(&self, transform: &TransformComponent) -> WorldSpaceShape {
        let scale = transform.scale.abs();
        let place = |offset: &Vec3| transform.position + transform.rotation * offset.component_mul(&transform.scale);

        match self {
            Self::Sphere { offset, radius } => {
                let scale_factor = scale.x.max(scale.y).max(scale.z);
                WorldSpaceShape::Sphere(BoundingSphere::new(place(offset), radius * scale_factor))
            }
            Self::Cuboid {
                offset,
                half_extents,
            } => WorldSpaceShape::Cuboid(Aabb::from_center_half_extents(
                place(offset),
                half_extents.component_mul(&scale),
            )),
        }
    }
}

impl Collider for CollisionShape {
    fn world_shape(&self, transform: &TransformComponent) -> WorldSpaceShape {
        self.to_world_space(transform)
    }
}

/// World-space collision shape (temporary, for testing only)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldSpaceShape {
    /// World-space sphere
    Sphere(BoundingSphere),
    /// World-space axis-aligned box
    Cuboid(Aabb),
}

impl WorldSpaceShape {
    /// Get center position
    pub fn center(&self) -> Vec3 {
        match self {
            Self::Sphere(sphere) => sphere.center,
            Self::Cuboid(aabb) => aabb.center(),
        }
    }

    /// Axis-aligned bounds
    pub fn bounds(&self) -> Aabb {
        match self {
            Self::Sphere(sphere) => sphere.bounds(),
            Self::Cuboid(aabb) => *aabb,
        }
    }

    /// Narrow-phase test against another shape
    pub fn collide(&self, other: &WorldSpaceShape) -> CollisionResult {
        match (self, other) {
            (Self::Sphere(a), Self::Sphere(b)) => {
                if a.intersects(b) {
                    CollisionResult::hit(vec![a.contact_point(b)])
                } else {
                    CollisionResult::none()
                }
            }

            (Self::Sphere(sphere), Self::Cuboid(aabb)) | (Self::Cuboid(aabb), Self::Sphere(sphere)) => {
                if sphere.intersects_aabb(aabb) {
                    CollisionResult::hit(vec![aabb.closest_point(sphere.center)])
                } else {
                    CollisionResult::none()
                }
            }

            (Self::Cuboid(a), Self::Cuboid(b)) => a
                .intersection(b)
                .map_or_else(CollisionResult::none, |overlap| {
                    CollisionResult::hit(vec![overlap.center()])
                }),
        }
    }
}
