//! Colliders and the arena that owns them
//!
//! A [`Collider`] pairs a model-space [`CollisionShape`] with a world
//! [`Transform`] and the flags and channels that decide whether it takes
//! part in overlap evaluation. Colliders live in a caller-owned
//! [`ColliderSet`] and are addressed by generational [`ColliderHandle`]s;
//! the collision manager never owns shape data.

use crate::foundation::collections::{ColliderHandle, HandleMap};
use crate::foundation::math::{utils, Quat, Transform, Vec3};
use crate::physics::collision::{CollisionShape, WorldSpaceShape};
use crate::physics::collision_layers::CollisionLayers;
use crate::spatial::AABB;

/// Identifier of the object that owns a collider
///
/// Opaque to the collision system; it is handed back in overlap events,
/// used by probes to skip the prober's own colliders and used to skip
/// pairs whose two colliders belong to the same object.
/// [`OwnerId::NONE`] (the default) marks an unowned collider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(pub u64);

impl OwnerId {
    /// No owner; never matches another collider's owner
    pub const NONE: Self = Self(0);

    /// True for any owner other than [`OwnerId::NONE`]
    pub fn is_some(self) -> bool {
        self != Self::NONE
    }
}

/// A collision shape placed in the world
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    /// Shape in model space
    pub shape: CollisionShape,
    /// World placement of the shape
    pub transform: Transform,
    /// Participates in collision at all
    pub collision_enabled: bool,
    /// Wants begin/end overlap notifications
    pub generate_overlap_events: bool,
    /// Layers this collider belongs to
    pub layer: CollisionLayers,
    /// Layers this collider interacts with
    pub mask: CollisionLayers,
    /// Owning object
    pub owner: OwnerId,
}

impl Collider {
    /// Create an enabled collider on every layer
    pub fn new(shape: CollisionShape, transform: Transform) -> Self {
        Self {
            shape,
            transform,
            collision_enabled: true,
            generate_overlap_events: true,
            layer: CollisionLayers::default(),
            mask: CollisionLayers::default(),
            owner: OwnerId::default(),
        }
    }

    /// Sphere centered at `center`
    pub fn sphere_at(center: Vec3, radius: f32) -> Self {
        Self::new(CollisionShape::sphere(radius), Transform::from_position(center))
    }

    /// World-aligned box centered at `center`
    pub fn cuboid_at(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(CollisionShape::cuboid(half_extents), Transform::from_position(center))
    }

    /// Rotated box centered at `center`
    pub fn oriented_cuboid(center: Vec3, rotation: Quat, half_extents: Vec3) -> Self {
        Self::new(
            CollisionShape::cuboid(half_extents),
            Transform::from_position_rotation(center, rotation),
        )
    }

    /// Capsule whose inner segment runs from `start` to `end`
    pub fn capsule_between(start: Vec3, end: Vec3, radius: f32) -> Self {
        let axis = end - start;
        let half_height = axis.magnitude() * 0.5 + radius;
        let transform =
            Transform::from_position_rotation((start + end) * 0.5, utils::rotation_from_z(axis));
        Self::new(CollisionShape::capsule(radius, half_height), transform)
    }

    /// Set the owning object
    pub fn with_owner(mut self, owner: OwnerId) -> Self {
        self.owner = owner;
        self
    }

    /// Set layer and mask
    pub fn with_layers(mut self, layer: CollisionLayers, mask: CollisionLayers) -> Self {
        self.layer = layer;
        self.mask = mask;
        self
    }

    /// Enable or disable overlap notifications
    pub fn with_overlap_events(mut self, enabled: bool) -> Self {
        self.generate_overlap_events = enabled;
        self
    }

    /// Enable or disable collision entirely
    pub fn with_collision_enabled(mut self, enabled: bool) -> Self {
        self.collision_enabled = enabled;
        self
    }

    /// True when the collider takes part in overlap evaluation
    pub fn is_active(&self) -> bool {
        self.collision_enabled && self.generate_overlap_events
    }

    /// True when the shape parameters, transform and world bound are usable
    ///
    /// Negative radii or extents and non-finite values are rejected.
    pub fn is_valid(&self) -> bool {
        let t = &self.transform;
        let finite = t.position.iter().chain(t.scale.iter()).all(|v| v.is_finite())
            && t.rotation.coords.iter().all(|v| v.is_finite());
        if !finite || !self.shape.is_valid() {
            return false;
        }
        let world = self.world_shape();
        world.is_valid() && world.world_bound().is_valid()
    }

    /// The shape transformed into world space
    pub fn world_shape(&self) -> WorldSpaceShape {
        self.shape.to_world_space(&self.transform)
    }

    /// Conservative world-space bound
    pub fn world_bound(&self) -> AABB {
        self.world_shape().world_bound()
    }

    /// Whether both colliders belong to the same owning object
    ///
    /// Unowned colliders never share an owner.
    pub fn shares_owner(&self, other: &Collider) -> bool {
        self.owner.is_some() && self.owner == other.owner
    }

    /// Mutual layer/mask filter against another collider
    pub fn accepts(&self, other: &Collider) -> bool {
        CollisionLayers::should_collide(self.layer, self.mask, other.layer, other.mask)
    }
}

/// Arena of colliders addressed by generational handles
///
/// Removing a collider invalidates its handle for good: a later insert that
/// reuses the slot gets a handle with a new generation.
#[derive(Debug, Default, Clone)]
pub struct ColliderSet {
    colliders: HandleMap<Collider>,
}

impl ColliderSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collider and return its handle
    pub fn insert(&mut self, collider: Collider) -> ColliderHandle {
        self.colliders.insert(collider)
    }

    /// Remove a collider; `None` if the handle is stale
    pub fn remove(&mut self, handle: ColliderHandle) -> Option<Collider> {
        self.colliders.remove(handle)
    }

    /// Borrow a collider
    pub fn get(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.get(handle)
    }

    /// Mutably borrow a collider
    ///
    /// Call [`CollisionManager::mark_dirty`](crate::physics::CollisionManager::mark_dirty)
    /// after moving a registered collider.
    pub fn get_mut(&mut self, handle: ColliderHandle) -> Option<&mut Collider> {
        self.colliders.get_mut(handle)
    }

    /// Whether the handle refers to a live collider
    pub fn contains(&self, handle: ColliderHandle) -> bool {
        self.colliders.contains_key(handle)
    }

    /// Number of live colliders
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// True when the set is empty
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Iterate over all live colliders
    pub fn iter(&self) -> impl Iterator<Item = (ColliderHandle, &Collider)> {
        self.colliders.iter()
    }
}
