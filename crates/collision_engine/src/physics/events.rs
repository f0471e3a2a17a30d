//! Overlap notifications
//!
//! The collision manager reports begin/end transitions to an
//! [`OverlapListener`]. Each event is addressed to one receiving collider;
//! an overlapping pair produces one event per participant.

use crate::foundation::collections::ColliderHandle;
use crate::physics::collider::OwnerId;
use crate::physics::collision::ContactInfo;

/// Which transition an event reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlapEventKind {
    /// The pair started overlapping this update
    Begin,
    /// The pair stopped overlapping, or the other collider went away
    End,
}

/// One overlap transition as seen by `receiver`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapEvent {
    /// Begin or end
    pub kind: OverlapEventKind,
    /// Collider the event is addressed to
    pub receiver: ColliderHandle,
    /// Owner of the receiving collider
    pub receiver_owner: OwnerId,
    /// The other collider of the pair (may already be removed on end)
    pub other: ColliderHandle,
    /// Owner of the other collider
    pub other_owner: OwnerId,
    /// Contact for begin events, normal pointing from receiver to other
    pub contact: Option<ContactInfo>,
}

impl OverlapEvent {
    /// True for begin events
    pub fn is_begin(&self) -> bool {
        self.kind == OverlapEventKind::Begin
    }

    /// True for end events
    pub fn is_end(&self) -> bool {
        self.kind == OverlapEventKind::End
    }
}

/// Receiver of overlap notifications
pub trait OverlapListener {
    /// `event.receiver` started overlapping `event.other`
    fn on_begin_overlap(&mut self, event: &OverlapEvent);

    /// `event.receiver` stopped overlapping `event.other`
    fn on_end_overlap(&mut self, event: &OverlapEvent);
}

/// Listener that records events in delivery order
#[derive(Debug, Default, Clone)]
pub struct OverlapEventQueue {
    events: Vec<OverlapEvent>,
}

impl OverlapEventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// All events received so far
    pub fn events(&self) -> &[OverlapEvent] {
        &self.events
    }

    /// Begin events only
    pub fn begins(&self) -> impl Iterator<Item = &OverlapEvent> {
        self.events.iter().filter(|e| e.is_begin())
    }

    /// End events only
    pub fn ends(&self) -> impl Iterator<Item = &OverlapEvent> {
        self.events.iter().filter(|e| e.is_end())
    }

    /// Events addressed to `receiver`
    pub fn for_receiver(&self, receiver: ColliderHandle) -> impl Iterator<Item = &OverlapEvent> {
        self.events.iter().filter(move |e| e.receiver == receiver)
    }

    /// Take every queued event, leaving the queue empty
    pub fn drain(&mut self) -> std::vec::Drain<'_, OverlapEvent> {
        self.events.drain(..)
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when no events are queued
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop all queued events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl OverlapListener for OverlapEventQueue {
    fn on_begin_overlap(&mut self, event: &OverlapEvent) {
        self.events.push(*event);
    }

    fn on_end_overlap(&mut self, event: &OverlapEvent) {
        self.events.push(*event);
    }
}
