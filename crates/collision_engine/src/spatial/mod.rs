//! Spatial partitioning data structures
//!
//! Provides the broad-phase index used for collision detection and
//! region queries in 3D space.

pub mod aabb;
pub mod morton;
pub mod lbvh;

pub use aabb::AABB;
pub use lbvh::{Lbvh, LbvhNode, NodeKind, DebugNode};
