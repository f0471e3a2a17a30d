//! World-space geometric primitives
//!
//! These are the shapes the narrow phase operates on. They are produced
//! on demand from model-space [`CollisionShape`](super::CollisionShape)s
//! and never stored by the collision manager.

use crate::foundation::math::Vec3;
use crate::spatial::AABB;

/// Segment parameters below this length squared are treated as points
pub const SEGMENT_EPSILON: f32 = 1.0e-8;

/// How two overlapping shapes touch
///
/// `normal` points from the first shape of the test toward the second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactInfo {
    /// Best-effort contact point in world space
    pub point: Vec3,
    /// Unit contact normal, first shape toward second
    pub normal: Vec3,
    /// Overlap distance along `normal` (never negative)
    pub penetration_depth: f32,
}

impl ContactInfo {
    /// Same contact seen from the other shape
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// A sphere in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl Sphere {
    /// Creates a new sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Axis-aligned bound enclosing the sphere
    pub fn world_bound(&self) -> AABB {
        let r = self.radius.abs();
        AABB::from_center_extents(self.center, Vec3::new(r, r, r))
    }
}

/// A box with arbitrary orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    /// Box center in world space
    pub center: Vec3,
    /// Orthonormal local axes in world space
    pub axes: [Vec3; 3],
    /// Half-size along each local axis
    pub half_extents: Vec3,
}

impl OrientedBox {
    /// Creates a box from center, axes and half-extents
    pub fn new(center: Vec3, axes: [Vec3; 3], half_extents: Vec3) -> Self {
        Self {
            center,
            axes,
            half_extents,
        }
    }

    /// Creates a world-aligned box
    pub fn axis_aligned(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center, [Vec3::x(), Vec3::y(), Vec3::z()], half_extents)
    }

    /// Axis-aligned bound enclosing the rotated box
    pub fn world_bound(&self) -> AABB {
        let mut extents = Vec3::zeros();
        for (axis, half) in self.axes.iter().zip(self.half_extents.iter()) {
            extents += axis.abs() * half.abs();
        }
        AABB::from_center_extents(self.center, extents)
    }

    /// Half-length of the box's projection onto unit vector `axis`
    pub fn projected_radius(&self, axis: &Vec3) -> f32 {
        self.axes
            .iter()
            .zip(self.half_extents.iter())
            .map(|(a, h)| h * a.dot(axis).abs())
            .sum()
    }

    /// Express a world-space point in the box's local frame
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        let d = point - self.center;
        Vec3::new(d.dot(&self.axes[0]), d.dot(&self.axes[1]), d.dot(&self.axes[2]))
    }

    /// Closest point on or inside the box to `point`
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let local = self.to_local(point);
        let mut closest = self.center;
        for i in 0..3 {
            let h = self.half_extents[i];
            closest += self.axes[i] * local[i].clamp(-h, h);
        }
        closest
    }

    /// Point where a ray from the center along unit `direction` leaves the box
    pub fn surface_point_toward(&self, direction: &Vec3) -> Vec3 {
        let mut t = f32::INFINITY;
        for i in 0..3 {
            let d = self.axes[i].dot(direction).abs();
            if d > SEGMENT_EPSILON {
                t = t.min(self.half_extents[i] / d);
            }
        }
        if t.is_finite() {
            self.center + direction * t
        } else {
            self.center
        }
    }
}

/// A capsule: every point within `radius` of a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    /// First endpoint of the inner segment
    pub start: Vec3,
    /// Second endpoint of the inner segment
    pub end: Vec3,
    /// Distance from the segment to the surface
    pub radius: f32,
}

impl Capsule {
    /// Creates a capsule around the segment `start`..`end`
    pub fn new(start: Vec3, end: Vec3, radius: f32) -> Self {
        Self { start, end, radius }
    }

    /// Axis-aligned bound enclosing the capsule
    pub fn world_bound(&self) -> AABB {
        let r = self.radius.abs();
        let r = Vec3::new(r, r, r);
        AABB::new(self.start.inf(&self.end) - r, self.start.sup(&self.end) + r)
    }

    /// Closest point on the inner segment to `point`
    pub fn closest_point_on_segment(&self, point: Vec3) -> Vec3 {
        closest_point_on_segment(point, self.start, self.end)
    }
}

/// Closest point on segment `a`..`b` to `point`
///
/// A zero-length segment returns `a`.
pub fn closest_point_on_segment(point: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.magnitude_squared();
    if len_sq < SEGMENT_EPSILON {
        return a;
    }
    let t = ((point - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Closest points between segments `p1`..`q1` and `p2`..`q2`
///
/// Returns `(c1, c2)` with `c1` on the first segment. Degenerate segments
/// collapse to points; near-parallel segments fall back to projecting the
/// first segment's start onto the second.
pub fn closest_points_between_segments(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> (Vec3, Vec3) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.magnitude_squared();
    let e = d2.magnitude_squared();
    let f = d2.dot(&r);

    if a < SEGMENT_EPSILON && e < SEGMENT_EPSILON {
        return (p1, p2);
    }

    let (s, t) = if a < SEGMENT_EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e < SEGMENT_EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;
            // Parallel segments have no unique answer; any s works, pick 0
            let mut s = if denom > SEGMENT_EPSILON * a * e {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    (p1 + d1 * s, p2 + d2 * t)
}
