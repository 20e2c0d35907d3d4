use ode_solvers::dop_shared::IntegrationError;
use thiserror::Error;

/// Errors that can occur during ODE integration.
///
/// `E` is the error type of the [`OdeProblem`](sprung_core::OdeProblem)
/// being integrated.
#[derive(Debug, Error)]
pub enum Error<E> {
    #[error("derivative evaluation failed at t = {t}")]
    Problem {
        t: f64,
        #[source]
        source: E,
    },

    #[error("initial state has non-finite value {value} at index {index}")]
    NonFiniteInitialState { index: usize, value: f64 },

    #[error("state became non-finite after t = {t} while advancing to sample {index}")]
    NonFiniteState { t: f64, index: usize },

    #[error("explicit integration failed after t = {t}")]
    Integration {
        t: f64,
        #[source]
        source: IntegrationError,
    },

    #[error("integration stopped at t = {t} short of sample {index}")]
    Stalled { t: f64, index: usize },

    #[error("step size {h} too small at t = {t}")]
    StepSizeTooSmall { t: f64, h: f64 },

    #[error("exceeded {max_steps} steps at t = {t}")]
    MaxStepsExceeded { t: f64, max_steps: usize },

    #[error("stopped by observer at t = {t}")]
    Stopped { t: f64 },

    #[error("solution has {actual} samples, expected {expected}")]
    Length { expected: usize, actual: usize },
}
