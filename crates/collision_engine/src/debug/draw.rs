//! Debug drawing command buffer
//!
//! Collects wireframe primitives for an external renderer. Temporary shapes
//! expire after their duration; persistent shapes stay until removed by id.
//! Nothing here renders: consumers pull [`DebugDrawSystem::get_shapes`].

use crate::foundation::math::{Quat, Vec3, Vec4};
use crate::spatial::AABB;
use std::collections::HashMap;

/// Unique identifier for persistent debug shapes
pub type DebugShapeId = String;

/// Debug shape primitives that can be rendered for visualization
#[derive(Clone, Debug, PartialEq)]
pub enum DebugShape {
    /// Line segment from start to end
    Line {
        /// First endpoint
        start: Vec3,
        /// Second endpoint
        end: Vec3,
        /// RGBA color
        color: Vec4,
        /// Seconds left
        duration: f32,
    },

    /// Wire sphere
    Sphere {
        /// Center
        center: Vec3,
        /// Radius
        radius: f32,
        /// RGBA color
        color: Vec4,
        /// Seconds left
        duration: f32,
    },

    /// Wire box, axis-aligned when `rotation` is identity
    Box {
        /// Center
        center: Vec3,
        /// Half-size along the rotated axes
        extents: Vec3,
        /// Orientation
        rotation: Quat,
        /// RGBA color
        color: Vec4,
        /// Seconds left
        duration: f32,
    },

    /// Wire capsule around the segment `start`..`end`
    Capsule {
        /// First segment endpoint
        start: Vec3,
        /// Second segment endpoint
        end: Vec3,
        /// Radius
        radius: f32,
        /// RGBA color
        color: Vec4,
        /// Seconds left
        duration: f32,
    },
}

impl DebugShape {
    fn duration_mut(&mut self) -> &mut f32 {
        match self {
            DebugShape::Line { duration, .. }
            | DebugShape::Sphere { duration, .. }
            | DebugShape::Box { duration, .. }
            | DebugShape::Capsule { duration, .. } => duration,
        }
    }

    /// Get remaining duration
    pub fn duration(&self) -> f32 {
        match self {
            DebugShape::Line { duration, .. }
            | DebugShape::Sphere { duration, .. }
            | DebugShape::Box { duration, .. }
            | DebugShape::Capsule { duration, .. } => *duration,
        }
    }

    /// Shape color
    pub fn color(&self) -> Vec4 {
        match self {
            DebugShape::Line { color, .. }
            | DebugShape::Sphere { color, .. }
            | DebugShape::Box { color, .. }
            | DebugShape::Capsule { color, .. } => *color,
        }
    }

    /// Set duration (returns modified shape)
    pub fn with_duration(mut self, new_duration: f32) -> Self {
        *self.duration_mut() = new_duration;
        self
    }

    /// Decrease duration by delta_time, returns true if expired
    pub fn tick(&mut self, delta_time: f32) -> bool {
        let duration = self.duration_mut();
        *duration -= delta_time;
        *duration <= 0.0
    }
}

/// Debug drawing system for rendering debug shapes
#[derive(Debug)]
pub struct DebugDrawSystem {
    /// Temporary shapes that expire after their duration
    temporary_shapes: Vec<DebugShape>,

    /// Persistent shapes that remain until manually removed
    persistent_shapes: HashMap<DebugShapeId, DebugShape>,

    /// Master enable/disable flag
    pub enabled: bool,
}

impl DebugDrawSystem {
    /// Create a new debug draw system
    pub fn new() -> Self {
        Self {
            temporary_shapes: Vec::new(),
            persistent_shapes: HashMap::new(),
            enabled: true,
        }
    }

    /// Queue a temporary shape
    pub fn draw(&mut self, shape: DebugShape) {
        if self.enabled {
            self.temporary_shapes.push(shape);
        }
    }

    /// Draw a line segment (temporary)
    pub fn draw_line(&mut self, start: Vec3, end: Vec3, color: Vec4, duration: f32) {
        self.draw(DebugShape::Line {
            start,
            end,
            color,
            duration,
        });
    }

    /// Draw a sphere (temporary)
    pub fn draw_sphere(&mut self, center: Vec3, radius: f32, color: Vec4, duration: f32) {
        self.draw(DebugShape::Sphere {
            center,
            radius,
            color,
            duration,
        });
    }

    /// Draw an axis-aligned box (temporary)
    pub fn draw_aabb(&mut self, bounds: &AABB, color: Vec4, duration: f32) {
        self.draw_box(bounds.center(), bounds.extents(), Quat::identity(), color, duration);
    }

    /// Draw a rotated box (temporary)
    pub fn draw_box(
        &mut self,
        center: Vec3,
        extents: Vec3,
        rotation: Quat,
        color: Vec4,
        duration: f32,
    ) {
        self.draw(DebugShape::Box {
            center,
            extents,
            rotation,
            color,
            duration,
        });
    }

    /// Draw a capsule (temporary)
    pub fn draw_capsule(&mut self, start: Vec3, end: Vec3, radius: f32, color: Vec4, duration: f32) {
        self.draw(DebugShape::Capsule {
            start,
            end,
            radius,
            color,
            duration,
        });
    }

    /// Draw a persistent shape that remains until explicitly removed
    pub fn draw_persistent(&mut self, id: impl Into<String>, shape: DebugShape) {
        if !self.enabled {
            return;
        }

        self.persistent_shapes.insert(id.into(), shape);
    }

    /// Remove a persistent shape
    pub fn clear_persistent(&mut self, id: &str) {
        self.persistent_shapes.remove(id);
    }

    /// Update shape lifetimes and remove expired temporary shapes
    pub fn update(&mut self, delta_time: f32) {
        if !self.enabled {
            return;
        }

        self.temporary_shapes.retain_mut(|shape| !shape.tick(delta_time));
    }

    /// Get all shapes for rendering (both temporary and persistent)
    pub fn get_shapes(&self) -> Vec<&DebugShape> {
        if !self.enabled {
            return Vec::new();
        }

        self.temporary_shapes
            .iter()
            .chain(self.persistent_shapes.values())
            .collect()
    }

    /// Get the number of active shapes
    pub fn shape_count(&self) -> usize {
        self.temporary_shapes.len() + self.persistent_shapes.len()
    }

    /// Clear all shapes (temporary and persistent)
    pub fn clear(&mut self) {
        self.temporary_shapes.clear();
        self.persistent_shapes.clear();
    }
}

impl Default for DebugDrawSystem {
    fn default() -> Self {
        Self::new()
    }
}
