//! Specialized collection types

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Generational handle to a [`Collider`](crate::physics::Collider)
    ///
    /// A handle whose slot has been reused compares unequal to the new
    /// occupant's handle, so stale handles are detected instead of aliasing.
    pub struct ColliderHandle;
}

/// Handle-based map using slot map for stable references
pub type HandleMap<T> = SlotMap<ColliderHandle, T>;
