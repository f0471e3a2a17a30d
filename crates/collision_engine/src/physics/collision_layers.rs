//! Collision channels for filtering candidate pairs
//!
//! Every collider sits on one or more layers and carries a mask of the
//! layers it wants to interact with. A pair is evaluated only when the
//! filter passes in both directions.

use bitflags::bitflags;

bitflags! {
    /// Collision layer bits, used both as a collider's layer and its mask
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CollisionLayers: u32 {
        /// Player character layer
        const PLAYER = 1 << 0;
        /// Non-player characters
        const ENEMY = 1 << 1;
        /// Projectiles (bullets, missiles, etc.)
        const PROJECTILE = 1 << 2;
        /// Static world geometry
        const ENVIRONMENT = 1 << 3;
        /// Trigger volumes (no physical response)
        const TRIGGER = 1 << 4;
        /// Camera probes and other query-only volumes
        const CAMERA = 1 << 5;
        /// Debris and small props
        const DEBRIS = 1 << 6;
        /// Pickups and collectibles
        const PICKUP = 1 << 7;
        /// Bits 8-31 are free for the application
        const _ = !0xFF;
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self::all()
    }
}

impl CollisionLayers {
    /// A single application-defined layer, `bit` in 8..32
    ///
    /// Returns `None` for bits that are out of range or reserved.
    pub fn custom(bit: u32) -> Option<Self> {
        if (8..32).contains(&bit) {
            Some(Self::from_bits_retain(1 << bit))
        } else {
            None
        }
    }

    /// Check if two colliders should collide based on their layers and masks
    ///
    /// A's layer must be in B's mask AND B's layer must be in A's mask.
    ///
    /// # Example
    /// ```
    /// use collision_engine::physics::CollisionLayers;
    ///
    /// let player_mask = CollisionLayers::ENEMY | CollisionLayers::ENVIRONMENT;
    /// let enemy_mask = CollisionLayers::PLAYER | CollisionLayers::PROJECTILE;
    ///
    /// assert!(CollisionLayers::should_collide(
    ///     CollisionLayers::PLAYER, player_mask,
    ///     CollisionLayers::ENEMY, enemy_mask,
    /// ));
    /// ```
    pub fn should_collide(
        layer_a: CollisionLayers,
        mask_a: CollisionLayers,
        layer_b: CollisionLayers,
        mask_b: CollisionLayers,
    ) -> bool {
        layer_a.intersects(mask_b) && layer_b.intersects(mask_a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_collide_mutual() {
        assert!(CollisionLayers::should_collide(
            CollisionLayers::PLAYER,
            CollisionLayers::ENEMY,
            CollisionLayers::ENEMY,
            CollisionLayers::PLAYER,
        ));
    }

    #[test]
    fn test_should_not_collide_one_way() {
        // Player wants the enemy, enemy only listens for projectiles
        assert!(!CollisionLayers::should_collide(
            CollisionLayers::PLAYER,
            CollisionLayers::ENEMY,
            CollisionLayers::ENEMY,
            CollisionLayers::PROJECTILE,
        ));
    }

    #[test]
    fn test_default_collides_with_everything() {
        let custom = CollisionLayers::custom(12).expect("valid custom bit");
        assert!(CollisionLayers::should_collide(
            custom,
            CollisionLayers::default(),
            CollisionLayers::TRIGGER,
            CollisionLayers::default(),
        ));
        assert!(CollisionLayers::custom(3).is_none());
        assert!(CollisionLayers::custom(32).is_none());
    }
}
