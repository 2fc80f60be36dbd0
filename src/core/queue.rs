//! # Pending event queue.
//!
//! [`EventQueue`] buffers geofence transitions while the background context
//! boots. It has no lock of its own: it lives inside the synchronizer's
//! critical section, so `enqueue` and `drain_in_order` are serialized with
//! the state checks that decide between queueing and forwarding.
//!
//! ## Rules
//! - FIFO in arrival order (arrival = acquisition of the dispatch lock)
//! - `drain_in_order` empties the queue; no event is returned twice
//! - Unbounded: a context that never signals ready grows it without limit

use std::collections::VecDeque;

use crate::regions::GeofenceEvent;

/// Ordered, unbounded buffer of pending transitions.
#[derive(Debug, Default)]
pub struct EventQueue {
    items: VecDeque<GeofenceEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `ev` to the tail; returns the new length.
    pub fn enqueue(&mut self, ev: GeofenceEvent) -> usize {
        self.items.push_back(ev);
        self.items.len()
    }

    /// Removes and returns every buffered event, oldest first.
    pub fn drain_in_order(&mut self) -> Vec<GeofenceEvent> {
        std::mem::take(&mut self.items).into()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
