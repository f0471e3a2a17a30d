//! Physics module for collision detection
//!
//! Provides narrow-phase shape tests, collider storage, channel filtering
//! and the per-frame [`CollisionManager`]. Collision response is left to
//! the caller.

pub mod collision;
pub mod collision_layers;
pub mod collider;
pub mod events;
pub mod collision_manager;

pub use collision::{
    Capsule,
    CollisionShape,
    ContactInfo,
    OrientedBox,
    Sphere,
    WorldSpaceShape,
};
pub use collision_layers::CollisionLayers;
pub use collider::{Collider, ColliderSet, OwnerId};
pub use events::{OverlapEvent, OverlapEventKind, OverlapEventQueue, OverlapListener};
pub use collision_manager::{CollisionManager, FrameStats, RegistrationId};
