//! Narrow-phase pairwise overlap tests
//!
//! Every test is pure and returns `Some(ContactInfo)` on overlap, with the
//! normal pointing from the first argument toward the second. Touching
//! shapes count as overlapping. [`test_overlap`] dispatches over both
//! shape kinds; reversed pairs reuse the forward test and flip the result.
//!
//! Box-vs-box reports a penetration depth of zero: only the separating
//! axis decision is exact, the contact point and normal are estimates.

use crate::foundation::math::{safe_normalize, Vec3, FALLBACK_NORMAL};
use super::primitives::{
    closest_points_between_segments, Capsule, ContactInfo, OrientedBox, Sphere,
};
use super::shape::WorldSpaceShape;

/// Cross-product axes shorter than this (squared) are skipped by SAT
pub const SAT_AXIS_EPSILON: f32 = 1.0e-6;

/// Segment directions below this magnitude are treated as parallel to a slab
const SLAB_EPSILON: f32 = 1.0e-8;

/// Test any two world-space shapes for overlap
pub fn test_overlap(a: &WorldSpaceShape, b: &WorldSpaceShape) -> Option<ContactInfo> {
    use WorldSpaceShape as S;
    match (a, b) {
        (S::Sphere(a), S::Sphere(b)) => sphere_sphere(a, b),
        (S::Sphere(s), S::OrientedBox(obb)) => sphere_box(s, obb),
        (S::OrientedBox(obb), S::Sphere(s)) => sphere_box(s, obb).map(ContactInfo::flipped),
        (S::OrientedBox(a), S::OrientedBox(b)) => box_box(a, b),
        (S::Capsule(c), S::Sphere(s)) => capsule_sphere(c, s),
        (S::Sphere(s), S::Capsule(c)) => capsule_sphere(c, s).map(ContactInfo::flipped),
        (S::Capsule(a), S::Capsule(b)) => capsule_capsule(a, b),
        (S::OrientedBox(obb), S::Capsule(c)) => box_capsule(obb, c),
        (S::Capsule(c), S::OrientedBox(obb)) => box_capsule(obb, c).map(ContactInfo::flipped),
    }
}

impl WorldSpaceShape {
    /// Test if this shape intersects with another shape
    pub fn intersects(&self, other: &WorldSpaceShape) -> bool {
        test_overlap(self, other).is_some()
    }

    /// Contact with another shape, normal pointing from `self` toward `other`
    pub fn contact(&self, other: &WorldSpaceShape) -> Option<ContactInfo> {
        test_overlap(self, other)
    }
}

/// Sphere vs sphere
///
/// Overlap iff `|cb - ca|² <= (ra + rb)²`. The contact point is the
/// midpoint of the two surface points along the normal.
pub fn sphere_sphere(a: &Sphere, b: &Sphere) -> Option<ContactInfo> {
    let delta = b.center - a.center;
    let dist_sq = delta.magnitude_squared();
    let radius_sum = a.radius + b.radius;
    if dist_sq > radius_sum * radius_sum {
        return None;
    }

    let normal = safe_normalize(delta, FALLBACK_NORMAL);
    let surface_a = a.center + normal * a.radius;
    let surface_b = b.center - normal * b.radius;
    Some(ContactInfo {
        point: (surface_a + surface_b) * 0.5,
        normal,
        penetration_depth: (radius_sum - dist_sq.sqrt()).max(0.0),
    })
}

/// Sphere vs oriented box, normal from the sphere toward the box
pub fn sphere_box(sphere: &Sphere, obb: &OrientedBox) -> Option<ContactInfo> {
    let closest = obb.closest_point(sphere.center);
    if (sphere.center - closest).magnitude_squared() > sphere.radius * sphere.radius {
        return None;
    }
    Some(sphere_box_contact(sphere.center, sphere.radius, obb))
}

/// Contact for a sphere already known to touch `obb`
fn sphere_box_contact(center: Vec3, radius: f32, obb: &OrientedBox) -> ContactInfo {
    let closest = obb.closest_point(center);
    let offset = closest - center;
    let dist_sq = offset.magnitude_squared();

    if dist_sq > SLAB_EPSILON {
        let dist = dist_sq.sqrt();
        return ContactInfo {
            point: closest,
            normal: offset / dist,
            penetration_depth: (radius - dist).max(0.0),
        };
    }

    // Center is inside the box: push out through the nearest face
    let local = obb.to_local(center);
    let mut best_axis = 0;
    let mut best_gap = f32::INFINITY;
    for i in 0..3 {
        let gap = obb.half_extents[i] - local[i].abs();
        if gap < best_gap {
            best_gap = gap;
            best_axis = i;
        }
    }
    let side = if local[best_axis] < 0.0 { -1.0 } else { 1.0 };
    let outward = obb.axes[best_axis] * side;
    let gap = best_gap.max(0.0);
    ContactInfo {
        point: center + outward * gap,
        normal: -outward,
        penetration_depth: radius + gap,
    }
}

/// Oriented box vs oriented box via the separating axis theorem
///
/// Tests the 3 + 3 face axes and the 9 edge-edge cross products, skipping
/// cross products of (nearly) parallel edges. Penetration depth is zero.
pub fn box_box(a: &OrientedBox, b: &OrientedBox) -> Option<ContactInfo> {
    let offset = b.center - a.center;

    let separated_on = |axis: &Vec3| {
        if axis.magnitude_squared() < SAT_AXIS_EPSILON {
            return false;
        }
        offset.dot(axis).abs() > a.projected_radius(axis) + b.projected_radius(axis)
    };

    if a.axes.iter().chain(b.axes.iter()).any(|axis| separated_on(axis)) {
        return None;
    }
    for axis_a in &a.axes {
        for axis_b in &b.axes {
            if separated_on(&axis_a.cross(axis_b)) {
                return None;
            }
        }
    }

    let normal = safe_normalize(offset, FALLBACK_NORMAL);
    let surface_a = a.surface_point_toward(&normal);
    let surface_b = b.surface_point_toward(&-normal);
    Some(ContactInfo {
        point: (surface_a + surface_b) * 0.5,
        normal,
        penetration_depth: 0.0,
    })
}

/// Capsule vs sphere, normal from the capsule toward the sphere
pub fn capsule_sphere(capsule: &Capsule, sphere: &Sphere) -> Option<ContactInfo> {
    let core = Sphere::new(capsule.closest_point_on_segment(sphere.center), capsule.radius);
    sphere_sphere(&core, sphere)
}

/// Capsule vs capsule
pub fn capsule_capsule(a: &Capsule, b: &Capsule) -> Option<ContactInfo> {
    let (on_a, on_b) = closest_points_between_segments(a.start, a.end, b.start, b.end);
    sphere_sphere(&Sphere::new(on_a, a.radius), &Sphere::new(on_b, b.radius))
}

/// Oriented box vs capsule, normal from the box toward the capsule
///
/// The segment is clipped against the box grown by the capsule radius on
/// every axis. Near the box's edges and corners this region is larger than
/// the true rounded Minkowski sum, so the test errs toward overlap.
pub fn box_capsule(obb: &OrientedBox, capsule: &Capsule) -> Option<ContactInfo> {
    let start = obb.to_local(capsule.start);
    let end = obb.to_local(capsule.end);
    let dir = end - start;
    let radius = capsule.radius.max(0.0);

    let mut t_min = 0.0_f32;
    let mut t_max = 1.0_f32;
    for i in 0..3 {
        let extent = obb.half_extents[i] + radius;
        if dir[i].abs() < SLAB_EPSILON {
            if start[i].abs() > extent {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir[i];
        let mut t1 = (-extent - start[i]) * inv;
        let mut t2 = (extent - start[i]) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }

    let t = (t_min + t_max) * 0.5;
    let on_segment = capsule.start + (capsule.end - capsule.start) * t;
    Some(sphere_box_contact(on_segment, radius, obb).flipped())
}
