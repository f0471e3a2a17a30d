//! Collision-specific debug visualization
//!
//! Turns the broad-phase tree and the registered colliders into
//! [`DebugShape`]s, colored by node kind and overlap state.

use std::fmt::Debug;
use std::hash::Hash;

use crate::config::DebugDrawConfig;
use crate::debug::draw::{DebugDrawSystem, DebugShape};
use crate::foundation::math::{Mat3, Quat, Vec3, Vec4};
use crate::physics::collision::{ContactInfo, WorldSpaceShape};
use crate::physics::{ColliderSet, CollisionManager};
use crate::spatial::Lbvh;

/// Length of drawn contact normals
const NORMAL_LENGTH: f32 = 0.5;

fn color(rgba: [f32; 4]) -> Vec4 {
    Vec4::new(rgba[0], rgba[1], rgba[2], rgba[3])
}

/// Collision-specific debug visualizer
///
/// Shapes are drawn with zero duration, so they last until the next
/// [`CollisionDebugVisualizer::update`].
#[derive(Debug)]
pub struct CollisionDebugVisualizer {
    debug_draw: DebugDrawSystem,
    config: DebugDrawConfig,
}

impl CollisionDebugVisualizer {
    /// Create a visualizer with the given colors and toggles
    pub fn new(config: DebugDrawConfig) -> Self {
        Self {
            debug_draw: DebugDrawSystem::new(),
            config,
        }
    }

    /// Draw every BVH node as a wire box
    pub fn draw_bvh<K>(&mut self, bvh: &Lbvh<K>)
    where
        K: Copy + Eq + Hash + Ord + Debug,
    {
        let leaf = color(self.config.leaf_color);
        let internal = color(self.config.internal_color);
        for node in bvh.debug_nodes() {
            let tint = if node.is_leaf { leaf } else { internal };
            self.debug_draw.draw_aabb(&node.bounds, tint, 0.0);
        }
    }

    /// Draw one world-space shape
    pub fn draw_shape(&mut self, shape: &WorldSpaceShape, tint: Vec4) {
        match shape {
            WorldSpaceShape::Sphere(sphere) => {
                self.debug_draw.draw_sphere(sphere.center, sphere.radius, tint, 0.0);
            }
            WorldSpaceShape::OrientedBox(obb) => {
                let rotation = Quat::from_matrix(&Mat3::from_columns(&obb.axes));
                self.debug_draw
                    .draw_box(obb.center, obb.half_extents, rotation, tint, 0.0);
            }
            WorldSpaceShape::Capsule(capsule) => {
                self.debug_draw
                    .draw_capsule(capsule.start, capsule.end, capsule.radius, tint, 0.0);
            }
        }
    }

    /// Draw every registered collider, highlighting overlapping ones
    pub fn draw_colliders(&mut self, manager: &CollisionManager, colliders: &ColliderSet) {
        let idle = color(self.config.collider_color);
        let hit = color(self.config.overlapping_color);
        for handle in manager.registered() {
            let Some(collider) = colliders.get(handle) else {
                continue;
            };
            let tint = if manager.overlapping(handle).is_empty() { idle } else { hit };
            self.draw_shape(&collider.world_shape(), tint);
        }
    }

    /// Draw a contact point and its normal
    pub fn draw_contact(&mut self, contact: &ContactInfo) {
        let tint = color(self.config.overlapping_color);
        let tip: Vec3 = contact.point + contact.normal * NORMAL_LENGTH;
        self.debug_draw.draw_line(contact.point, tip, tint, 0.0);
    }

    /// Draw whatever the config enables for the current frame
    pub fn draw_frame(&mut self, manager: &CollisionManager, colliders: &ColliderSet) {
        if self.config.draw_bvh {
            self.draw_bvh(manager.bvh());
        }
        if self.config.draw_colliders {
            self.draw_colliders(manager, colliders);
        }
    }

    /// Clear all visualization
    pub fn clear(&mut self) {
        self.debug_draw.clear();
    }

    /// Update debug system (expire temporary shapes)
    pub fn update(&mut self, delta_time: f32) {
        self.debug_draw.update(delta_time);
    }

    /// Get all debug shapes for rendering
    pub fn get_shapes(&self) -> Vec<&DebugShape> {
        self.debug_draw.get_shapes()
    }

    /// Enable/disable the entire debug system
    pub fn set_enabled(&mut self, enabled: bool) {
        self.debug_draw.enabled = enabled;
    }

    /// Get mutable reference to underlying debug draw system
    pub fn debug_draw_mut(&mut self) -> &mut DebugDrawSystem {
        &mut self.debug_draw
    }
}

impl Default for CollisionDebugVisualizer {
    fn default() -> Self {
        Self::new(DebugDrawConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{Collider, OverlapEventQueue};
    use crate::spatial::AABB;

    #[test]
    fn test_bvh_nodes_use_kind_colors() {
        let mut bvh = Lbvh::new(1);
        for i in 0..4 {
            let center = Vec3::new(i as f32 * 4.0, 0.0, 0.0);
            bvh.update(i, AABB::from_center_extents(center, Vec3::new(1.0, 1.0, 1.0)));
        }
        bvh.flush_rebuild();

        let mut viz = CollisionDebugVisualizer::default();
        viz.draw_bvh(&bvh);
        let shapes = viz.get_shapes();
        assert_eq!(shapes.len(), bvh.node_count());

        let leaf = color(DebugDrawConfig::default().leaf_color);
        assert_eq!(shapes.iter().filter(|s| s.color() == leaf).count(), 4);

        viz.update(0.016);
        assert!(viz.get_shapes().is_empty());
    }

    #[test]
    fn test_overlapping_colliders_are_highlighted() {
        let mut set = ColliderSet::new();
        let mut manager = CollisionManager::new();
        let a = set.insert(Collider::sphere_at(Vec3::zeros(), 1.0));
        let b = set.insert(Collider::cuboid_at(Vec3::new(1.5, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0)));
        let c = set.insert(Collider::capsule_between(
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 2.0),
            0.5,
        ));
        manager.register_many(&set, [a, b, c]);
        manager.update_collisions(&set, 0.016, &mut OverlapEventQueue::new());

        let config = DebugDrawConfig {
            draw_bvh: false,
            ..DebugDrawConfig::default()
        };
        let hit = color(config.overlapping_color);
        let mut viz = CollisionDebugVisualizer::new(config);
        viz.draw_frame(&manager, &set);

        let shapes = viz.get_shapes();
        assert_eq!(shapes.len(), 3);
        assert_eq!(shapes.iter().filter(|s| s.color() == hit).count(), 2);
    }
}
