//! Collision geometry and narrow-phase tests
//!
//! # Architecture
//!
//! - **Model Space Storage**: [`CollisionShape`] lives on the collider in local coordinates
//! - **On-Demand Transformation**: [`WorldSpaceShape`] is built only for bounds and tests
//! - **Closed Dispatch**: [`test_overlap`] matches on both shape kinds, so every
//!   combination is checked at compile time
//!
//! # Module Organization
//!
//! - [`primitives`] - World-space sphere, oriented box, capsule and contact info
//! - [`shape`] - Model-space shapes and their world-space counterparts
//! - [`narrow_phase`] - Pairwise overlap tests

pub mod primitives;
pub mod shape;
pub mod narrow_phase;

pub use primitives::{Capsule, ContactInfo, OrientedBox, Sphere};
pub use shape::{CollisionShape, WorldSpaceShape};
pub use narrow_phase::test_overlap;
