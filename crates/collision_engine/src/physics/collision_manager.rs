//! Collision manager: registration, broad phase, narrow phase and events
//!
//! The manager is the only stateful part of the collision subsystem. It
//! tracks registered colliders by handle, keeps their bounds in a
//! [`Lbvh`] keyed by a monotonically assigned [`RegistrationId`], and once
//! per frame turns the current overlap set into begin/end notifications.
//!
//! # Frame flow
//!
//! 1. Moved colliders call [`CollisionManager::mark_dirty`], which only
//!    records the new bound and defers the rebuild.
//! 2. [`CollisionManager::update_collisions`] flushes the rebuild, queries
//!    the tree once per active collider, and runs the narrow phase only for
//!    candidates with a greater registration id, so every unordered pair is
//!    tested once. Pairs whose colliders share an owner are skipped.
//! 3. Each collider's new partner set is diffed against the previous one.
//!    Receivers are visited in registration order; each receives its ends
//!    before its begins.
//!
//! Invalid input (stale handles, non-finite bounds) is logged and ignored;
//! nothing here returns an error during a frame.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use log::{debug, trace, warn};

use crate::config::{CollisionConfig, ConfigError};
use crate::foundation::collections::ColliderHandle;
use crate::physics::collider::{Collider, ColliderSet, OwnerId};
use crate::physics::collision::{test_overlap, ContactInfo, WorldSpaceShape};
use crate::physics::events::{OverlapEvent, OverlapEventKind, OverlapListener};
use crate::spatial::{Lbvh, AABB};

/// Registration order of a collider, used as the canonical pair order
///
/// Ids are never reused, even after unregistering or clearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(u64);

impl RegistrationId {
    /// Raw numeric value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Counters for the most recent [`CollisionManager::update_collisions`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Registered colliders at the start of the update
    pub tracked: usize,
    /// Colliders that queried the tree (both flags set)
    pub shapes_evaluated: usize,
    /// Tree hits, including self hits and lower-id partners
    pub broad_phase_candidates: usize,
    /// Pairs handed to the narrow phase
    pub narrow_phase_tests: usize,
    /// Pairs confirmed overlapping
    pub overlapping_pairs: usize,
    /// Unordered pairs that started overlapping
    pub pairs_begun: usize,
    /// Unordered pairs that stopped overlapping
    pub pairs_ended: usize,
    /// Begin notifications delivered (one per participant)
    pub begin_events: usize,
    /// End notifications delivered (one per surviving participant)
    pub end_events: usize,
    /// Whether the tree was rebuilt at the start of the update
    pub rebuilt: bool,
}

/// Partner as remembered from the last completed update
#[derive(Debug, Clone, Copy)]
struct Partner {
    handle: ColliderHandle,
    owner: OwnerId,
}

/// Partners of one collider, keyed by their registration id
type OverlapRecord = BTreeMap<RegistrationId, Partner>;

/// Overlaps found this frame: per collider, its partners with the contact
/// seen from that collider's side
type FrameOverlaps = BTreeMap<RegistrationId, BTreeMap<RegistrationId, (Partner, ContactInfo)>>;

#[derive(Debug, Clone)]
struct TrackedShape {
    id: RegistrationId,
    owner: OwnerId,
    overlaps: OverlapRecord,
}

/// A collider taking part in the current update
struct ActiveShape<'a> {
    handle: ColliderHandle,
    collider: &'a Collider,
    world: WorldSpaceShape,
    bounds: AABB,
}

/// Per-frame overlap detection over a caller-owned [`ColliderSet`]
#[derive(Debug)]
pub struct CollisionManager {
    config: CollisionConfig,
    bvh: Lbvh<RegistrationId>,
    tracked: HashMap<ColliderHandle, TrackedShape>,
    by_id: BTreeMap<RegistrationId, ColliderHandle>,
    next_id: u64,
    last_stats: FrameStats,
}

impl Default for CollisionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionManager {
    /// Create a manager with the default configuration
    pub fn new() -> Self {
        Self::from_valid_config(CollisionConfig::default())
    }

    /// Create a manager from a configuration, rejecting invalid values
    pub fn with_config(config: CollisionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: CollisionConfig) -> Self {
        Self {
            bvh: Lbvh::new(config.max_leaf_size),
            config,
            tracked: HashMap::new(),
            by_id: BTreeMap::new(),
            next_id: 1,
            last_stats: FrameStats::default(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Start tracking a collider, or refresh its bound if already tracked
    ///
    /// Returns `None` (and logs) for stale handles and unusable bounds.
    pub fn register(
        &mut self,
        colliders: &ColliderSet,
        handle: ColliderHandle,
    ) -> Option<RegistrationId> {
        let (id, bounds) = self.track(colliders, handle)?;
        self.bvh.update(id, bounds);
        Some(id)
    }

    /// Register a batch of colliders and rebuild the tree immediately
    ///
    /// Returns the ids of the colliders that were accepted, in input order.
    pub fn register_many<I>(&mut self, colliders: &ColliderSet, handles: I) -> Vec<RegistrationId>
    where
        I: IntoIterator<Item = ColliderHandle>,
    {
        let entries: Vec<(RegistrationId, AABB)> = handles
            .into_iter()
            .filter_map(|handle| self.track(colliders, handle))
            .collect();
        let ids = entries.iter().map(|(id, _)| *id).collect();
        self.bvh.bulk_update(entries);
        debug!(
            "Bulk registered {} colliders ({} tracked, {} BVH nodes)",
            self.bvh.len(),
            self.tracked.len(),
            self.bvh.node_count()
        );
        ids
    }

    fn track(
        &mut self,
        colliders: &ColliderSet,
        handle: ColliderHandle,
    ) -> Option<(RegistrationId, AABB)> {
        let Some(collider) = colliders.get(handle) else {
            warn!("register: collider {handle:?} does not exist, ignoring");
            return None;
        };
        if !collider.is_valid() {
            warn!(
                "register: {} collider {handle:?} has invalid geometry {:?}, ignoring",
                collider.shape.kind_name(),
                collider.shape
            );
            return None;
        }
        let bounds = collider.world_bound();

        if let Some(tracked) = self.tracked.get_mut(&handle) {
            tracked.owner = collider.owner;
            return Some((tracked.id, bounds));
        }

        let id = RegistrationId(self.next_id);
        self.next_id += 1;
        self.tracked.insert(
            handle,
            TrackedShape {
                id,
                owner: collider.owner,
                overlaps: OverlapRecord::new(),
            },
        );
        self.by_id.insert(id, handle);
        trace!("Registered {} collider {handle:?} as {id}", collider.shape.kind_name());
        Some((id, bounds))
    }

    /// Stop tracking a collider
    ///
    /// Partners that were overlapping it receive an end event on the next
    /// update. Returns false (and logs) if the handle was not tracked.
    pub fn unregister(&mut self, handle: ColliderHandle) -> bool {
        let Some(tracked) = self.tracked.remove(&handle) else {
            warn!("unregister: collider {handle:?} is not registered, ignoring");
            return false;
        };
        self.by_id.remove(&tracked.id);
        self.bvh.remove(tracked.id);
        trace!("Unregistered collider {handle:?} ({})", tracked.id);
        true
    }

    /// Refresh the cached bound of a moved collider; the rebuild is deferred
    pub fn mark_dirty(&mut self, colliders: &ColliderSet, handle: ColliderHandle) -> bool {
        let Some(tracked) = self.tracked.get_mut(&handle) else {
            warn!("mark_dirty: collider {handle:?} is not registered, ignoring");
            return false;
        };
        let Some(collider) = colliders.get(handle) else {
            warn!("mark_dirty: collider {handle:?} no longer exists, ignoring");
            return false;
        };
        if !collider.is_valid() {
            warn!(
                "mark_dirty: collider {handle:?} has invalid geometry {:?}, keeping the old bound",
                collider.shape
            );
            return false;
        }
        let bounds = collider.world_bound();
        tracked.owner = collider.owner;
        self.bvh.update(tracked.id, bounds);
        true
    }

    /// Rebuild the tree now if anything changed
    pub fn flush_rebuild(&mut self) -> bool {
        let rebuilt = self.bvh.flush_rebuild();
        if rebuilt {
            debug!(
                "BVH rebuilt: {} entries, {} nodes, depth {}",
                self.bvh.len(),
                self.bvh.node_count(),
                self.bvh.depth()
            );
        }
        rebuilt
    }

    /// Whether a rebuild is pending
    pub fn is_dirty(&self) -> bool {
        self.bvh.is_dirty()
    }

    /// Find every registered collider whose cached bound intersects `region`
    ///
    /// Results are ordered by registration id.
    pub fn query_region(&mut self, region: &AABB) -> Vec<ColliderHandle> {
        self.flush_rebuild();
        let mut ids = self.bvh.query(region);
        ids.sort_unstable();
        ids.into_iter()
            .filter_map(|id| self.by_id.get(&id).copied())
            .collect()
    }

    /// Colliders overlapping an arbitrary probe shape
    ///
    /// Candidates come from the tree and are confirmed with the narrow
    /// phase. Colliders with either flag cleared, and those owned by
    /// `ignore_owner`, are skipped. Contact normals point from the probe
    /// toward the hit collider.
    pub fn overlap_probe(
        &mut self,
        colliders: &ColliderSet,
        probe: &WorldSpaceShape,
        ignore_owner: Option<OwnerId>,
    ) -> Vec<(ColliderHandle, ContactInfo)> {
        let region = probe.world_bound();
        self.query_region(&region)
            .into_iter()
            .filter_map(|handle| {
                let collider = colliders.get(handle)?;
                if !collider.is_active() || Some(collider.owner) == ignore_owner {
                    return None;
                }
                test_overlap(probe, &collider.world_shape()).map(|contact| (handle, contact))
            })
            .collect()
    }

    /// Run the broad and narrow phase and deliver begin/end notifications
    ///
    /// Call once per simulation step after transforms are final.
    /// `delta_time` only appears in trace output.
    pub fn update_collisions(
        &mut self,
        colliders: &ColliderSet,
        delta_time: f32,
        listener: &mut dyn OverlapListener,
    ) -> FrameStats {
        self.purge_missing(colliders);

        let mut stats = FrameStats {
            tracked: self.tracked.len(),
            rebuilt: self.flush_rebuild(),
            ..FrameStats::default()
        };

        if self.tracked.is_empty() {
            self.last_stats = stats;
            return stats;
        }

        let active = self.collect_active(colliders);
        let new_overlaps = self.find_overlaps(&active, &mut stats);
        self.deliver(new_overlaps, listener, &mut stats);

        if self.config.log_frame_stats {
            debug!("Collision frame (dt={delta_time:.4}): {stats:?}");
        } else {
            trace!("Collision frame (dt={delta_time:.4}): {stats:?}");
        }
        self.last_stats = stats;
        stats
    }

    /// Unregister tracked handles whose collider was removed from the set
    fn purge_missing(&mut self, colliders: &ColliderSet) {
        let missing: Vec<ColliderHandle> = self
            .by_id
            .values()
            .copied()
            .filter(|handle| !colliders.contains(*handle))
            .collect();
        for handle in missing {
            warn!("Collider {handle:?} was removed without unregistering; dropping it");
            self.unregister(handle);
        }
    }

    fn collect_active<'a>(&self, colliders: &'a ColliderSet) -> BTreeMap<RegistrationId, ActiveShape<'a>> {
        let mut active = BTreeMap::new();
        for (&id, &handle) in &self.by_id {
            let Some(collider) = colliders.get(handle) else {
                continue;
            };
            if !collider.is_active() {
                continue;
            }
            debug_assert!(self.bvh.contains(id), "tracked collider {id} has no cached bound");
            let Some(bounds) = self.bvh.bounds_of(id).copied() else {
                continue;
            };
            active.insert(
                id,
                ActiveShape {
                    handle,
                    collider,
                    world: collider.world_shape(),
                    bounds,
                },
            );
        }
        active
    }

    /// Confirmed partners per collider, contact seen from the key's side
    fn find_overlaps(
        &self,
        active: &BTreeMap<RegistrationId, ActiveShape<'_>>,
        stats: &mut FrameStats,
    ) -> FrameOverlaps {
        let mut overlaps = FrameOverlaps::new();
        let mut candidates = Vec::new();

        for (&id, shape) in active {
            stats.shapes_evaluated += 1;
            candidates.clear();
            self.bvh.query_into(&shape.bounds, &mut candidates);
            stats.broad_phase_candidates += candidates.len();

            for &other_id in &candidates {
                if other_id <= id {
                    continue;
                }
                let Some(other) = active.get(&other_id) else {
                    continue;
                };
                if shape.collider.shares_owner(other.collider)
                    || !shape.collider.accepts(other.collider)
                {
                    continue;
                }

                stats.narrow_phase_tests += 1;
                let Some(contact) = test_overlap(&shape.world, &other.world) else {
                    continue;
                };
                stats.overlapping_pairs += 1;

                let partner_of_shape = Partner {
                    handle: other.handle,
                    owner: other.collider.owner,
                };
                let partner_of_other = Partner {
                    handle: shape.handle,
                    owner: shape.collider.owner,
                };
                overlaps
                    .entry(id)
                    .or_default()
                    .insert(other_id, (partner_of_shape, contact));
                overlaps
                    .entry(other_id)
                    .or_default()
                    .insert(id, (partner_of_other, contact.flipped()));
            }
        }
        overlaps
    }

    /// Diff every tracked collider's partners and replace its record
    fn deliver(
        &mut self,
        mut new_overlaps: FrameOverlaps,
        listener: &mut dyn OverlapListener,
        stats: &mut FrameStats,
    ) {
        let mut begun: BTreeSet<(RegistrationId, RegistrationId)> = BTreeSet::new();
        let mut ended: BTreeSet<(RegistrationId, RegistrationId)> = BTreeSet::new();

        for (&id, handle) in &self.by_id {
            debug_assert!(self.tracked.contains_key(handle), "registration {id} has no tracked collider");
            let Some(tracked) = self.tracked.get_mut(handle) else {
                continue;
            };
            let current = new_overlaps.remove(&id).unwrap_or_default();

            for (&other_id, partner) in &tracked.overlaps {
                if current.contains_key(&other_id) {
                    continue;
                }
                ended.insert(ordered_pair(id, other_id));
                stats.end_events += 1;
                listener.on_end_overlap(&OverlapEvent {
                    kind: OverlapEventKind::End,
                    receiver: *handle,
                    receiver_owner: tracked.owner,
                    other: partner.handle,
                    other_owner: partner.owner,
                    contact: None,
                });
            }

            for (&other_id, (partner, contact)) in &current {
                if tracked.overlaps.contains_key(&other_id) {
                    continue;
                }
                begun.insert(ordered_pair(id, other_id));
                stats.begin_events += 1;
                listener.on_begin_overlap(&OverlapEvent {
                    kind: OverlapEventKind::Begin,
                    receiver: *handle,
                    receiver_owner: tracked.owner,
                    other: partner.handle,
                    other_owner: partner.owner,
                    contact: Some(*contact),
                });
            }

            tracked.overlaps = current
                .into_iter()
                .map(|(other_id, (partner, _))| (other_id, partner))
                .collect();
        }

        stats.pairs_begun = begun.len();
        stats.pairs_ended = ended.len();
    }

    /// Partners of `handle` as of the last update, in registration order
    pub fn overlapping(&self, handle: ColliderHandle) -> Vec<ColliderHandle> {
        self.tracked
            .get(&handle)
            .map(|t| t.overlaps.values().map(|p| p.handle).collect())
            .unwrap_or_default()
    }

    /// Whether `a` and `b` overlapped as of the last update
    pub fn is_overlapping(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        self.tracked
            .get(&a)
            .is_some_and(|t| t.overlaps.values().any(|p| p.handle == b))
    }

    /// Whether `handle` is currently tracked
    pub fn is_registered(&self, handle: ColliderHandle) -> bool {
        self.tracked.contains_key(&handle)
    }

    /// Registration id of a tracked collider
    pub fn registration_id(&self, handle: ColliderHandle) -> Option<RegistrationId> {
        self.tracked.get(&handle).map(|t| t.id)
    }

    /// Handle registered under `id`
    pub fn handle_of(&self, id: RegistrationId) -> Option<ColliderHandle> {
        self.by_id.get(&id).copied()
    }

    /// Tracked handles in registration order
    pub fn registered(&self) -> impl Iterator<Item = ColliderHandle> + '_ {
        self.by_id.values().copied()
    }

    /// Cached bound of a tracked collider
    pub fn cached_bound(&self, handle: ColliderHandle) -> Option<AABB> {
        let id = self.registration_id(handle)?;
        self.bvh.bounds_of(id).copied()
    }

    /// Number of tracked colliders
    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    /// True when nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Counters from the last update
    pub fn stats(&self) -> FrameStats {
        self.last_stats
    }

    /// The broad-phase tree, for inspection and debug drawing
    pub fn bvh(&self) -> &Lbvh<RegistrationId> {
        &self.bvh
    }

    /// Log the broad-phase tree at debug level
    pub fn dump_bvh(&self) {
        self.bvh.dump();
    }

    /// Forget every collider and overlap record without delivering events
    pub fn clear(&mut self) {
        self.tracked.clear();
        self.by_id.clear();
        self.bvh.clear();
        self.last_stats = FrameStats::default();
        debug!("Collision manager cleared");
    }
}

fn ordered_pair(a: RegistrationId, b: RegistrationId) -> (RegistrationId, RegistrationId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::physics::collision_layers::CollisionLayers;
    use crate::physics::events::OverlapEventQueue;

    fn sphere(set: &mut ColliderSet, x: f32, radius: f32) -> ColliderHandle {
        set.insert(Collider::sphere_at(Vec3::new(x, 0.0, 0.0), radius))
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut set = ColliderSet::new();
        let mut manager = CollisionManager::new();
        let a = sphere(&mut set, 0.0, 1.0);

        let first = manager.register(&set, a);
        let second = manager.register(&set, a);
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.bvh().len(), 1);
    }

    #[test]
    fn test_registration_ids_increase() {
        let mut set = ColliderSet::new();
        let mut manager = CollisionManager::new();
        let a = sphere(&mut set, 0.0, 1.0);
        let b = sphere(&mut set, 5.0, 1.0);
        let id_a = manager.register(&set, a).unwrap();
        let id_b = manager.register(&set, b).unwrap();
        assert!(id_a < id_b);

        manager.unregister(a);
        let id_c = manager.register(&set, a).unwrap();
        assert!(id_c > id_b);
    }

    #[test]
    fn test_stale_handles_are_no_ops() {
        let mut set = ColliderSet::new();
        let mut manager = CollisionManager::new();
        let a = sphere(&mut set, 0.0, 1.0);
        set.remove(a);

        assert!(manager.register(&set, a).is_none());
        assert!(!manager.unregister(a));
        assert!(!manager.mark_dirty(&set, a));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_invalid_bound_rejected() {
        let mut set = ColliderSet::new();
        let mut manager = CollisionManager::new();
        let a = set.insert(Collider::sphere_at(Vec3::new(f32::NAN, 0.0, 0.0), 1.0));
        assert!(manager.register(&set, a).is_none());
    }

    #[test]
    fn test_negative_sizes_rejected() {
        let mut set = ColliderSet::new();
        let mut manager = CollisionManager::new();
        let negative = sphere(&mut set, 0.0, -1.0);
        let inverted_box = set.insert(Collider::cuboid_at(Vec3::zeros(), Vec3::new(1.0, -1.0, 1.0)));
        let inverted_capsule = set.insert(Collider::new(
            crate::physics::collision::CollisionShape::capsule(0.5, -2.0),
            crate::foundation::math::Transform::identity(),
        ));
        assert!(manager.register(&set, negative).is_none());
        assert!(manager.register(&set, inverted_box).is_none());
        assert!(manager.register(&set, inverted_capsule).is_none());
        assert!(manager.is_empty());

        // A registered collider that turns invalid keeps its last good bound
        let a = sphere(&mut set, 0.0, 1.0);
        let b = sphere(&mut set, 1.5, 1.0);
        manager.register_many(&set, [a, b]);
        let before = manager.cached_bound(a);
        if let Some(collider) = set.get_mut(a) {
            collider.shape = crate::physics::collision::CollisionShape::sphere(-1.0);
        }
        assert!(!manager.mark_dirty(&set, a));
        assert_eq!(manager.cached_bound(a), before);
    }

    #[test]
    fn test_mark_dirty_defers_rebuild() {
        let mut set = ColliderSet::new();
        let mut manager = CollisionManager::new();
        let a = sphere(&mut set, 0.0, 1.0);
        manager.register(&set, a);
        manager.flush_rebuild();
        assert!(!manager.is_dirty());

        set.get_mut(a).unwrap().transform.position = Vec3::new(10.0, 0.0, 0.0);
        assert!(manager.mark_dirty(&set, a));
        assert!(manager.is_dirty());

        let moved = AABB::new(Vec3::new(9.5, -0.5, -0.5), Vec3::new(10.5, 0.5, 0.5));
        assert_eq!(manager.query_region(&moved), vec![a]);
        assert!(!manager.is_dirty());
    }

    #[test]
    fn test_begin_and_end_events() {
        let mut set = ColliderSet::new();
        let mut manager = CollisionManager::new();
        let a = sphere(&mut set, 0.0, 1.0);
        let b = sphere(&mut set, 1.5, 1.0);
        manager.register(&set, a);
        manager.register(&set, b);

        let mut queue = OverlapEventQueue::new();
        let stats = manager.update_collisions(&set, 0.016, &mut queue);
        assert_eq!(stats.pairs_begun, 1);
        assert_eq!(queue.begins().count(), 2);
        assert!(manager.is_overlapping(a, b));
        assert!(manager.is_overlapping(b, a));

        let to_b = queue.for_receiver(a).next().unwrap();
        assert_eq!(to_b.other, b);
        let contact = to_b.contact.unwrap();
        assert!(contact.normal.x > 0.99);

        queue.clear();
        set.get_mut(b).unwrap().transform.position = Vec3::new(3.0, 0.0, 0.0);
        manager.mark_dirty(&set, b);
        let stats = manager.update_collisions(&set, 0.016, &mut queue);
        assert_eq!(stats.pairs_ended, 1);
        assert_eq!(queue.ends().count(), 2);
        assert!(queue.ends().all(|e| e.contact.is_none()));
        assert!(!manager.is_overlapping(a, b));
    }

    #[test]
    fn test_unregistered_partner_still_ends() {
        let mut set = ColliderSet::new();
        let mut manager = CollisionManager::new();
        let a = sphere(&mut set, 0.0, 1.0);
        let b = sphere(&mut set, 1.0, 1.0);
        manager.register(&set, a);
        manager.register(&set, b);

        let mut queue = OverlapEventQueue::new();
        manager.update_collisions(&set, 0.016, &mut queue);
        queue.clear();

        manager.unregister(b);
        set.remove(b);
        manager.update_collisions(&set, 0.016, &mut queue);
        let ends: Vec<_> = queue.ends().collect();
        assert_eq!(ends.len(), 1);
        assert_eq!(ends[0].receiver, a);
        assert_eq!(ends[0].other, b);
    }

    #[test]
    fn test_removed_without_unregister_is_purged() {
        let mut set = ColliderSet::new();
        let mut manager = CollisionManager::new();
        let a = sphere(&mut set, 0.0, 1.0);
        let b = sphere(&mut set, 1.0, 1.0);
        manager.register(&set, a);
        manager.register(&set, b);

        let mut queue = OverlapEventQueue::new();
        manager.update_collisions(&set, 0.016, &mut queue);
        queue.clear();

        set.remove(b);
        manager.update_collisions(&set, 0.016, &mut queue);
        assert!(!manager.is_registered(b));
        assert_eq!(queue.ends().count(), 1);
    }

    #[test]
    fn test_flags_gate_evaluation() {
        let mut set = ColliderSet::new();
        let mut manager = CollisionManager::new();
        let a = sphere(&mut set, 0.0, 1.0);
        let b = set.insert(Collider::sphere_at(Vec3::new(1.0, 0.0, 0.0), 1.0).with_overlap_events(false));
        manager.register(&set, a);
        manager.register(&set, b);

        let mut queue = OverlapEventQueue::new();
        let stats = manager.update_collisions(&set, 0.016, &mut queue);
        assert!(queue.is_empty());
        assert_eq!(stats.shapes_evaluated, 1);
        assert_eq!(stats.narrow_phase_tests, 0);

        // Turning events on later produces the begin
        set.get_mut(b).unwrap().generate_overlap_events = true;
        manager.update_collisions(&set, 0.016, &mut queue);
        assert_eq!(queue.begins().count(), 2);

        // Disabling collision ends it
        queue.clear();
        set.get_mut(a).unwrap().collision_enabled = false;
        manager.update_collisions(&set, 0.016, &mut queue);
        assert_eq!(queue.ends().count(), 2);
    }

    #[test]
    fn test_layer_filtering() {
        let mut set = ColliderSet::new();
        let mut manager = CollisionManager::new();
        let player = set.insert(
            Collider::sphere_at(Vec3::zeros(), 1.0)
                .with_layers(CollisionLayers::PLAYER, CollisionLayers::ENEMY),
        );
        let wall = set.insert(
            Collider::sphere_at(Vec3::new(1.0, 0.0, 0.0), 1.0)
                .with_layers(CollisionLayers::ENVIRONMENT, CollisionLayers::all()),
        );
        manager.register(&set, player);
        manager.register(&set, wall);

        let mut queue = OverlapEventQueue::new();
        let stats = manager.update_collisions(&set, 0.016, &mut queue);
        assert!(queue.is_empty());
        assert_eq!(stats.narrow_phase_tests, 0);
    }

    #[test]
    fn test_receiver_gets_ends_before_begins() {
        let mut set = ColliderSet::new();
        let mut manager = CollisionManager::new();
        let a = sphere(&mut set, 0.0, 1.0);
        let b = sphere(&mut set, 1.5, 1.0);
        let c = sphere(&mut set, 10.0, 1.0);
        manager.register_many(&set, [a, b, c]);

        let mut queue = OverlapEventQueue::new();
        manager.update_collisions(&set, 0.016, &mut queue);
        queue.clear();

        // b leaves and c arrives in the same frame
        for (handle, x) in [(b, 20.0), (c, -1.5)] {
            if let Some(collider) = set.get_mut(handle) {
                collider.transform.position = Vec3::new(x, 0.0, 0.0);
            }
            assert!(manager.mark_dirty(&set, handle));
        }
        manager.update_collisions(&set, 0.016, &mut queue);

        let seen: Vec<_> = queue.for_receiver(a).map(|e| (e.kind, e.other)).collect();
        assert_eq!(
            seen,
            vec![(OverlapEventKind::End, b), (OverlapEventKind::Begin, c)]
        );
    }

    #[test]
    fn test_same_owner_pairs_are_skipped() {
        let mut set = ColliderSet::new();
        let mut manager = CollisionManager::new();
        let body = set.insert(Collider::sphere_at(Vec3::zeros(), 1.0).with_owner(OwnerId(5)));
        let trigger = set.insert(
            Collider::sphere_at(Vec3::new(0.5, 0.0, 0.0), 1.0).with_owner(OwnerId(5)),
        );
        let stranger = set.insert(
            Collider::sphere_at(Vec3::new(-1.0, 0.0, 0.0), 1.0).with_owner(OwnerId(6)),
        );
        manager.register_many(&set, [body, trigger, stranger]);

        let mut queue = OverlapEventQueue::new();
        manager.update_collisions(&set, 0.016, &mut queue);
        assert!(!manager.is_overlapping(body, trigger));
        assert!(manager.is_overlapping(body, stranger));
        assert!(manager.is_overlapping(trigger, stranger));
        assert!(queue.for_receiver(body).all(|e| e.other != trigger));
        assert_eq!(queue.begins().count(), 4);
    }

    #[test]
    fn test_unowned_colliders_still_overlap() {
        let mut set = ColliderSet::new();
        let mut manager = CollisionManager::new();
        let a = sphere(&mut set, 0.0, 1.0);
        let b = sphere(&mut set, 1.0, 1.0);
        manager.register_many(&set, [a, b]);

        manager.update_collisions(&set, 0.016, &mut OverlapEventQueue::new());
        assert!(manager.is_overlapping(a, b));
    }

    #[test]
    fn test_overlap_probe_ignores_owner() {
        let mut set = ColliderSet::new();
        let mut manager = CollisionManager::new();
        let own = set.insert(Collider::sphere_at(Vec3::zeros(), 1.0).with_owner(OwnerId(7)));
        let wall = set.insert(Collider::cuboid_at(Vec3::new(0.0, 0.0, -3.0), Vec3::new(5.0, 5.0, 0.5)));
        manager.register_many(&set, [own, wall]);

        let probe: WorldSpaceShape =
            crate::physics::collision::Sphere::new(Vec3::new(0.0, 0.0, -1.5), 1.2).into();
        let hits = manager.overlap_probe(&set, &probe, Some(OwnerId(7)));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, wall);
        assert!(hits[0].1.normal.z < -0.99);

        let hits = manager.overlap_probe(&set, &probe, None);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_register_many_builds_immediately() {
        let mut set = ColliderSet::new();
        let mut manager = CollisionManager::new();
        let handles: Vec<_> = (0..20).map(|i| sphere(&mut set, i as f32 * 3.0, 1.0)).collect();
        let ids = manager.register_many(&set, handles.iter().copied());
        assert_eq!(ids.len(), 20);
        assert!(!manager.is_dirty());
        assert!(manager.bvh().node_count() > 1);
    }

    #[test]
    fn test_with_config_rejects_zero_leaf_size() {
        let config = CollisionConfig {
            max_leaf_size: 0,
            ..CollisionConfig::default()
        };
        assert!(CollisionManager::with_config(config).is_err());
    }

    #[test]
    fn test_clear_forgets_everything() {
        let mut set = ColliderSet::new();
        let mut manager = CollisionManager::new();
        let a = sphere(&mut set, 0.0, 1.0);
        let b = sphere(&mut set, 1.0, 1.0);
        manager.register(&set, a);
        manager.register(&set, b);
        let mut queue = OverlapEventQueue::new();
        manager.update_collisions(&set, 0.016, &mut queue);

        manager.clear();
        queue.clear();
        let stats = manager.update_collisions(&set, 0.016, &mut queue);
        assert!(queue.is_empty());
        assert_eq!(stats.tracked, 0);
        assert!(manager.overlapping(a).is_empty());
    }
}
