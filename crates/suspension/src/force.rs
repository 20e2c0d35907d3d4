use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A time-varying external force `F(t)` applied to the suspension mass.
///
/// Forces are evaluated at arbitrary `t ≥ 0` within the simulated horizon,
/// including times between output samples, and must return the same value
/// whenever they are evaluated at the same `t`.
///
/// Any `Fn(f64) -> f64` is a force:
///
/// ```
/// use sprung_suspension::Force;
///
/// let ramp = |t: f64| 100.0 * t;
/// assert_eq!(ramp.evaluate(2.0), Ok(200.0));
/// ```
///
/// Closures that can fail should be wrapped in [`Fallible`].
pub trait Force {
    /// Returns the force in newtons at time `t` in seconds.
    ///
    /// # Errors
    ///
    /// Returns a [`ForceFault`] if the force cannot be computed at `t`.
    fn evaluate(&self, t: f64) -> Result<f64, ForceFault>;
}

impl<F> Force for F
where
    F: Fn(f64) -> f64,
{
    fn evaluate(&self, t: f64) -> Result<f64, ForceFault> {
        Ok(self(t))
    }
}

/// Adapts a fallible closure into a [`Force`].
///
/// The closure's error is rendered into [`ForceFault::Failed`].
#[derive(Debug, Clone, Copy)]
pub struct Fallible<F>(pub F);

impl<F, E> Force for Fallible<F>
where
    F: Fn(f64) -> Result<f64, E>,
    E: Display,
{
    fn evaluate(&self, t: f64) -> Result<f64, ForceFault> {
        (self.0)(t).map_err(|err| ForceFault::Failed(err.to_string()))
    }
}

/// The reason a force could not be evaluated.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ForceFault {
    #[error("force is not finite: {0}")]
    NonFinite(f64),

    #[error("force evaluated at a negative or non-finite time")]
    InvalidTime,

    #[error("{0}")]
    Failed(String),
}

/// A force evaluation failure at a specific time.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("force evaluation failed at t = {time}")]
pub struct ForceEvaluationError {
    pub time: f64,
    #[source]
    pub reason: ForceFault,
}

/// Evaluates a [`Force`] and checks its result.
///
/// Every evaluation is required to happen at a finite, non-negative time and
/// to yield a finite value.
#[derive(Debug)]
pub struct ForceEvaluator<'a, F: ?Sized> {
    force: &'a F,
}

impl<F: ?Sized> Clone for ForceEvaluator<'_, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: ?Sized> Copy for ForceEvaluator<'_, F> {}

impl<'a, F: Force + ?Sized> ForceEvaluator<'a, F> {
    /// Wraps a force.
    #[must_use]
    pub fn new(force: &'a F) -> Self {
        Self { force }
    }

    /// Evaluates the force at `t`.
    ///
    /// # Errors
    ///
    /// Returns a [`ForceEvaluationError`] if `t` is negative or non-finite, the
    /// force fails, or the force returns a non-finite value.
    pub fn evaluate(&self, t: f64) -> Result<f64, ForceEvaluationError> {
        let fail = |reason| ForceEvaluationError { time: t, reason };

        if !t.is_finite() || t < 0.0 {
            return Err(fail(ForceFault::InvalidTime));
        }

        let value = self.force.evaluate(t).map_err(fail)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(fail(ForceFault::NonFinite(value)))
        }
    }
}

/// No external force.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZeroForce;

impl Force for ZeroForce {
    fn evaluate(&self, _t: f64) -> Result<f64, ForceFault> {
        Ok(0.0)
    }
}

/// A constant force applied over a closed time window and zero elsewhere.
///
/// A vehicle crossing a speed breaker is well described by a short pulse,
/// for example 5000 N over the first 0.1 s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pulse {
    /// Force in newtons while the pulse is active.
    pub magnitude: f64,
    /// First time (s) at which the force applies.
    pub start: f64,
    /// Last time (s) at which the force applies.
    pub end: f64,
}

impl Pulse {
    /// Creates a pulse of `magnitude` over `[start, end]`.
    #[must_use]
    pub fn new(magnitude: f64, start: f64, end: f64) -> Self {
        Self {
            magnitude,
            start,
            end,
        }
    }
}

impl Force for Pulse {
    fn evaluate(&self, t: f64) -> Result<f64, ForceFault> {
        if (self.start..=self.end).contains(&t) {
            Ok(self.magnitude)
        } else {
            Ok(0.0)
        }
    }
}

/// A sinusoidal force `amplitude · sin(ω·t)`, such as a rough road surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sinusoid {
    /// Peak force in newtons.
    pub amplitude: f64,
    /// Angular frequency `ω` in rad/s.
    pub angular_frequency: f64,
}

impl Sinusoid {
    /// Creates a sinusoid with peak `amplitude` at `angular_frequency` rad/s.
    #[must_use]
    pub fn new(amplitude: f64, angular_frequency: f64) -> Self {
        Self {
            amplitude,
            angular_frequency,
        }
    }
}

impl Force for Sinusoid {
    fn evaluate(&self, t: f64) -> Result<f64, ForceFault> {
        Ok(self.amplitude * (self.angular_frequency * t).sin())
    }
}
