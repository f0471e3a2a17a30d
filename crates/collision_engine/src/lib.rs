//! # Collision Engine
//!
//! Overlap detection for real-time 3D simulations.
//!
//! ## Features
//!
//! - **Narrow Phase**: Exact sphere, oriented box and capsule tests with contact info
//! - **Broad Phase**: Linear BVH built from Morton codes, rebuilt lazily
//! - **Overlap Events**: Begin/end notifications delivered once per pair and participant
//! - **Probes**: Ad-hoc region and shape queries against the registered set
//! - **Debug Drawing**: Draw commands for the tree and the colliders
//!
//! ## Quick Start
//!
//! ```rust
//! use collision_engine::prelude::*;
//!
//! let mut colliders = ColliderSet::new();
//! let a = colliders.insert(Collider::sphere_at(Vec3::zeros(), 1.0));
//! let b = colliders.insert(Collider::sphere_at(Vec3::new(0.0, 0.0, 1.5), 1.0));
//!
//! let mut manager = CollisionManager::new();
//! manager.register(&colliders, a);
//! manager.register(&colliders, b);
//!
//! let mut events = OverlapEventQueue::new();
//! manager.update_collisions(&colliders, 1.0 / 60.0, &mut events);
//! assert_eq!(events.begins().count(), 2);
//! assert!(manager.is_overlapping(a, b));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod spatial;
pub mod physics;
pub mod debug;

/// Common imports for collision users
pub mod prelude {
    pub use crate::{
        config::{CollisionConfig, Config, ConfigError, DebugDrawConfig},
        debug::CollisionDebugVisualizer,
        foundation::{
            collections::ColliderHandle,
            math::{Quat, Transform, Vec3},
        },
        physics::{
            Collider, ColliderSet, CollisionLayers, CollisionManager, CollisionShape,
            ContactInfo, FrameStats, OverlapEvent, OverlapEventKind, OverlapEventQueue,
            OverlapListener, OwnerId, RegistrationId, WorldSpaceShape,
        },
        spatial::AABB,
    };
}
