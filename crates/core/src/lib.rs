//! Core traits and types for the Sprung workspace.
//!
//! This crate defines the shared abstractions that solvers, observers, and
//! physical models build on:
//!
//! - [`OdeProblem`] — a first-order system `dy/dt = f(t, y)` with `N` states
//! - [`State`] — the independent variable and state vector at one point
//! - [`Observer`] — receives solver events and optionally returns control actions

mod observer;
mod ode;

pub use observer::Observer;
pub use ode::{OdeProblem, State};
