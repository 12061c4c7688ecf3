//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for reacting to lifecycle events (audit
//! trails, metrics, test probes). Each subscriber is driven by a dedicated
//! worker task fed by a bounded queue owned by the
//! [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow; they never block the supervisor nor other
//!   subscribers.
//! - On queue overflow, events for that subscriber are **dropped** (warn).
//! - A panic inside `on_event` is caught and logged; the worker keeps going.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use svcvisor::{Event, EventKind, Subscribe};
//!
//! struct Pager;
//!
//! #[async_trait]
//! impl Subscribe for Pager {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::WorkerPanicked {
//!             // page someone
//!         }
//!     }
//!     fn name(&self) -> &'static str { "pager" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single event.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
