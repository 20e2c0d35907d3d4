//! A single-degree-of-freedom suspension model.
//!
//! The suspension is a spring-mass-damper governed by
//!
//! ```text
//! m·x'' + c·x' + k·x = F(t)
//! ```
//!
//! and this crate turns validated physical parameters into time-domain
//! trajectories of displacement and velocity:
//!
//! 1. [`SuspensionModel::new`] validates `(m, c, k)`, derives the natural
//!    frequency, critical damping and damping ratio, and classifies the
//!    [`DampingRegime`].
//! 2. [`solve_homogeneous`] and [`solve_forced`] integrate the equivalent
//!    first-order [`StateSpace`] system across a uniform time grid, with the
//!    external [`Force`] evaluated and checked at every derivative call.
//! 3. The trajectory is checked for non-finite values before it is returned
//!    as a [`SimulationResult`].
//!
//! Every failure surfaces as a [`SimulationError`]; a partial trajectory is
//! never returned.
//!
//! # Example
//!
//! ```
//! use sprung_suspension::{DampingRegime, SuspensionModel, Sinusoid};
//!
//! let model = SuspensionModel::new(1200.0, 3000.0, 25000.0)?;
//! assert_eq!(model.regime(), DampingRegime::Underdamped);
//!
//! let road = Sinusoid::new(2000.0, 8.0);
//! let result = model.solve_forced(0.0, 0.0, &road, 10.0, 1000)?;
//! assert_eq!(result.len(), 1000);
//! # Ok::<(), sprung_suspension::SimulationError>(())
//! ```

mod error;
mod force;
mod model;
mod parameters;
mod request;
mod result;
mod simulate;
mod state_space;
mod units;

pub use error::{Derived, Parameter, SimulationError, TrajectoryShape};
pub use force::{
    Fallible, Force, ForceEvaluationError, ForceEvaluator, ForceFault, Pulse, Sinusoid, ZeroForce,
};
pub use model::{CRITICAL_DAMPING_TOLERANCE, DampingRegime, RESONANCE_BAND, SuspensionModel};
pub use parameters::validate_parameters;
pub use request::{DEFAULT_SAMPLE_COUNT, DEFAULT_TIME_HORIZON, SimulationRequest};
pub use result::{Sample, SimulationResult, validate_trajectory};
pub use simulate::{solve, solve_forced, solve_homogeneous};
pub use state_space::StateSpace;
pub use units::{DampingCoefficient, Stiffness};

pub use sprung_solvers::ode::{Config, ConfigError, Method};
