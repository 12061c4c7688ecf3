//! Init retry policies.
//!
//! ## Contents
//! - [`RetryPolicy`] how many `init` attempts and the delay between them
//! - [`BackoffPolicy`] how delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`] randomization to avoid synchronized retries
//!
//! ## Wiring
//! ```text
//! SupervisorBuilder::register_with_retry(name, worker, RetryPolicy)
//!      └─► core::init uses policy.retry(|| worker.init(span), on_retry)
//!           └─► on_retry publishes InitRetryScheduled { attempt, delay }
//! ```
//!
//! Workers registered without a policy get exactly one `init` call.

mod backoff;
mod jitter;
mod retry;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use retry::RetryPolicy;
