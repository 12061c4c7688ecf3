//! # Event bus for lifecycle events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`].
//!
//! ## Architecture
//! ```text
//! Publishers:                         Consumer (one):
//!   SupervisorBuilder ──┐
//!   init phase        ──┼──► Bus ───► event listener ───► SubscriberSet
//!   run race          ──┤   (broadcast)  (spawned by run)
//!   termination       ──┘
//! ```
//!
//! The supervisor creates its receiver together with the bus, so events
//! published during registration (before any runtime exists) are buffered and
//! delivered once `run` spawns the listener.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **Bounded capacity**: one ring buffer shared by all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for lifecycle events.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus and its first receiver. Capacity is clamped to at least 1.
    pub fn new(capacity: usize) -> (Self, broadcast::Receiver<Event>) {
        let (tx, rx) = broadcast::channel::<Event>(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Publishes an event to all active receivers; dropped if there are none.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }
}
