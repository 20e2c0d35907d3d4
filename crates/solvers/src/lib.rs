//! Numerical solvers for the Sprung workspace.
//!
//! - [`ode`] — integrates an [`OdeProblem`] over a uniform output grid using
//!   the `ode_solvers` explicit methods, switching to an implicit TR-BDF2
//!   method when the problem turns out to be stiff.
//!
//! [`OdeProblem`]: sprung_core::OdeProblem

pub mod ode;
