//! Capability traits for cross-solver observers.
//!
//! These traits abstract over solver-specific action types, enabling
//! observers to work generically across different solvers.
//!
//! # Example
//!
//! ```rust
//! use sprung_core::Observer;
//! use sprung_observers::traits::CanStopEarly;
//!
//! struct MaxEvents {
//!     remaining: usize,
//! }
//!
//! impl<E, A: CanStopEarly> Observer<E, A> for MaxEvents {
//!     fn observe(&mut self, _event: &E) -> Option<A> {
//!         if self.remaining == 0 {
//!             return Some(A::stop_early());
//!         }
//!         self.remaining -= 1;
//!         None
//!     }
//! }
//! ```

use sprung_solvers::ode;

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the solver early.
    fn stop_early() -> Self;
}

impl CanStopEarly for ode::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}
