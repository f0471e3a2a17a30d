//! High-level collision shape abstractions
//!
//! Shapes are stored in model space and transformed to world space
//! on demand, immediately before a bound is cached or a test is run.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Transform, Vec3};
use crate::spatial::AABB;
use super::primitives::{Capsule, OrientedBox, Sphere};

/// Collision shape types (stored in MODEL SPACE)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CollisionShape {
    /// Sphere centered on the transform origin
    Sphere {
        /// Unscaled radius
        radius: f32,
    },
    /// Box centered on the transform origin
    Box {
        /// Unscaled half-size along local X, Y and Z
        half_extents: Vec3,
    },
    /// Capsule along local +Z
    Capsule {
        /// Unscaled radius
        radius: f32,
        /// Distance from the center to the tip of either cap
        half_height: f32,
    },
}

impl CollisionShape {
    /// Creates a spherical collision shape
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Creates a box collision shape
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::Box { half_extents }
    }

    /// Creates a capsule collision shape
    ///
    /// `half_height` is measured to the tip of a cap, so values below
    /// `radius` collapse the inner segment to a point.
    pub fn capsule(radius: f32, half_height: f32) -> Self {
        Self::Capsule {
            radius,
            half_height,
        }
    }

    /// Short name of the shape kind, for logs
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Sphere { .. } => "sphere",
            Self::Box { .. } => "box",
            Self::Capsule { .. } => "capsule",
        }
    }

    /// True when every parameter is finite and non-negative
    ///
    /// Zero sizes are allowed and produce degenerate but well-defined shapes.
    pub fn is_valid(&self) -> bool {
        let usable = |v: f32| v.is_finite() && v >= 0.0;
        match *self {
            Self::Sphere { radius } => usable(radius),
            Self::Box { half_extents } => half_extents.iter().all(|&e| usable(e)),
            Self::Capsule {
                radius,
                half_height,
            } => usable(radius) && usable(half_height),
        }
    }

    /// Transform this shape to world space
    pub fn to_world_space(&self, transform: &Transform) -> WorldSpaceShape {
        let scale = transform.scale.abs();
        match *self {
            Self::Sphere { radius } => {
                let max_scale = scale.x.max(scale.y).max(scale.z);
                WorldSpaceShape::Sphere(Sphere::new(transform.position, radius * max_scale))
            }
            Self::Box { half_extents } => {
                let axes = [
                    transform.rotate_vector(Vec3::x()),
                    transform.rotate_vector(Vec3::y()),
                    transform.rotate_vector(Vec3::z()),
                ];
                WorldSpaceShape::OrientedBox(OrientedBox::new(
                    transform.position,
                    axes,
                    half_extents.abs().component_mul(&scale),
                ))
            }
            Self::Capsule {
                radius,
                half_height,
            } => {
                let world_radius = radius * scale.x.max(scale.y);
                let half_segment = (half_height - radius).max(0.0) * scale.z;
                let offset = transform.rotate_vector(Vec3::z()) * half_segment;
                WorldSpaceShape::Capsule(Capsule::new(
                    transform.position - offset,
                    transform.position + offset,
                    world_radius,
                ))
            }
        }
    }
}

/// World-space collision shape (temporary, for testing only)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldSpaceShape {
    /// World-space sphere
    Sphere(Sphere),
    /// World-space oriented box
    OrientedBox(OrientedBox),
    /// World-space capsule
    Capsule(Capsule),
}

impl WorldSpaceShape {
    /// Get center position
    pub fn center(&self) -> Vec3 {
        match self {
            Self::Sphere(sphere) => sphere.center,
            Self::OrientedBox(obb) => obb.center,
            Self::Capsule(capsule) => (capsule.start + capsule.end) * 0.5,
        }
    }

    /// True when every coordinate is finite and every size non-negative
    pub fn is_valid(&self) -> bool {
        let finite = |v: &Vec3| v.iter().all(|c| c.is_finite());
        let usable = |v: f32| v.is_finite() && v >= 0.0;
        match self {
            Self::Sphere(sphere) => finite(&sphere.center) && usable(sphere.radius),
            Self::OrientedBox(obb) => {
                finite(&obb.center)
                    && obb.axes.iter().all(finite)
                    && obb.half_extents.iter().all(|&e| usable(e))
            }
            Self::Capsule(capsule) => {
                finite(&capsule.start) && finite(&capsule.end) && usable(capsule.radius)
            }
        }
    }

    /// Conservative axis-aligned bound
    pub fn world_bound(&self) -> AABB {
        match self {
            Self::Sphere(sphere) => sphere.world_bound(),
            Self::OrientedBox(obb) => obb.world_bound(),
            Self::Capsule(capsule) => capsule.world_bound(),
        }
    }
}

impl From<Sphere> for WorldSpaceShape {
    fn from(sphere: Sphere) -> Self {
        Self::Sphere(sphere)
    }
}

impl From<OrientedBox> for WorldSpaceShape {
    fn from(obb: OrientedBox) -> Self {
        Self::OrientedBox(obb)
    }
}

impl From<Capsule> for WorldSpaceShape {
    fn from(capsule: Capsule) -> Self {
        Self::Capsule(capsule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_scales_by_largest_axis() {
        let transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0))
            .with_scale(Vec3::new(1.0, -3.0, 2.0));
        match CollisionShape::sphere(0.5).to_world_space(&transform) {
            WorldSpaceShape::Sphere(s) => {
                assert_eq!(s.center, Vec3::new(1.0, 2.0, 3.0));
                assert_relative_eq!(s.radius, 1.5);
            }
            other => panic!("expected sphere, got {other:?}"),
        }
    }

    #[test]
    fn test_box_axes_follow_rotation() {
        let rotation = Quat::from_axis_angle(&Vec3::z_axis(), std::f32::consts::FRAC_PI_2);
        let transform = Transform::from_position_rotation(Vec3::zeros(), rotation)
            .with_scale(Vec3::new(2.0, 1.0, 1.0));
        match CollisionShape::cuboid(Vec3::new(1.0, 1.0, 1.0)).to_world_space(&transform) {
            WorldSpaceShape::OrientedBox(b) => {
                assert_relative_eq!(b.axes[0], Vec3::y(), epsilon = 1e-6);
                assert_relative_eq!(b.half_extents, Vec3::new(2.0, 1.0, 1.0));
                let bound = b.world_bound();
                assert_relative_eq!(bound.max, Vec3::new(1.0, 2.0, 1.0), epsilon = 1e-5);
            }
            other => panic!("expected box, got {other:?}"),
        }
    }

    #[test]
    fn test_capsule_segment_excludes_caps() {
        let transform = Transform::from_position(Vec3::new(0.0, 0.0, 1.0));
        match CollisionShape::capsule(0.5, 1.5).to_world_space(&transform) {
            WorldSpaceShape::Capsule(c) => {
                assert_relative_eq!(c.start, Vec3::zeros());
                assert_relative_eq!(c.end, Vec3::new(0.0, 0.0, 2.0));
                assert_relative_eq!(c.radius, 0.5);
            }
            other => panic!("expected capsule, got {other:?}"),
        }
    }

    #[test]
    fn test_short_capsule_collapses_to_point() {
        let shape = CollisionShape::capsule(1.0, 0.5).to_world_space(&Transform::identity());
        match shape {
            WorldSpaceShape::Capsule(c) => assert_eq!(c.start, c.end),
            other => panic!("expected capsule, got {other:?}"),
        }
        let bound = shape.world_bound();
        assert_eq!(bound.max, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_negative_sizes_are_invalid() {
        assert!(CollisionShape::sphere(1.0).is_valid());
        assert!(CollisionShape::sphere(0.0).is_valid());
        assert!(!CollisionShape::sphere(-1.0).is_valid());
        assert!(!CollisionShape::cuboid(Vec3::new(1.0, -0.5, 1.0)).is_valid());
        assert!(!CollisionShape::capsule(0.5, -2.0).is_valid());
        assert!(!CollisionShape::capsule(-0.5, 2.0).is_valid());
        assert!(!CollisionShape::sphere(f32::NAN).is_valid());
        // Short capsules are fine; the segment collapses to a point
        assert!(CollisionShape::capsule(1.0, 0.5).is_valid());
    }

    #[test]
    fn test_world_shape_validity() {
        let good: WorldSpaceShape = Sphere::new(Vec3::zeros(), 1.0).into();
        assert!(good.is_valid());
        let negative: WorldSpaceShape = Sphere::new(Vec3::zeros(), -1.0).into();
        assert!(!negative.is_valid());
        let far: WorldSpaceShape =
            Capsule::new(Vec3::zeros(), Vec3::new(f32::INFINITY, 0.0, 0.0), 0.5).into();
        assert!(!far.is_valid());
    }
}
