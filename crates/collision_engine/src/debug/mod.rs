//! Debug module for visualization and debugging tools
//!
//! Produces draw commands only; rendering belongs to the host application.

pub mod draw;
pub mod collision_debug;

pub use draw::{DebugShape, DebugDrawSystem, DebugShapeId};
pub use collision_debug::CollisionDebugVisualizer;
