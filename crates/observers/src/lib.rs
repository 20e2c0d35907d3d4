//! Reusable observers for the Sprung workspace.
//!
//! This crate provides [`Observer`] implementations that bound or report on a
//! running solve:
//!
//! - [`Deadline`] — stops the solve once a wall-clock budget is spent
//! - [`Cancellation`] — stops the solve when a shared token is cancelled
//! - [`TraceSteps`] — emits a `tracing` event for every accepted ODE step
//!
//! Stopping observers are generic over any action implementing
//! [`CanStopEarly`], so they work with every solver that can be aborted.
//!
//! [`Observer`]: sprung_core::Observer
//! [`CanStopEarly`]: traits::CanStopEarly

pub mod traits;

mod cancel;
mod trace;

pub use cancel::{Cancellation, Deadline};
pub use trace::TraceSteps;
