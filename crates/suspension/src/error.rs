use std::{error::Error as StdError, fmt};

use thiserror::Error;

use crate::force::ForceEvaluationError;

/// Errors that can occur when building a model or simulating it.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A physical parameter or request field is out of range.
    #[error("{field} must be {requirement}, got {value}", requirement = .field.requirement())]
    InvalidParameter { field: Parameter, value: f64 },

    /// A derived model quantity is not finite.
    #[error("derived {quantity} is not finite: {value}")]
    Computation { quantity: Derived, value: f64 },

    /// The forcing function failed or returned a non-finite value.
    #[error(transparent)]
    ForceEvaluation(#[from] ForceEvaluationError),

    /// The integrator produced no solution or a malformed one.
    #[error("integration failed")]
    IntegrationFailure(#[source] Box<dyn StdError + Send + Sync>),

    /// The trajectory contains a NaN or infinite value.
    #[error("trajectory diverged at sample {index} (t = {time})")]
    Divergence { index: usize, time: f64 },

    /// An observer stopped the solve.
    #[error("simulation cancelled at t = {time}")]
    Cancelled { time: f64 },
}

impl SimulationError {
    pub(crate) fn integration<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::IntegrationFailure(Box::new(err))
    }
}

/// Identifies a validated input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    Mass,
    Damping,
    Stiffness,
    InitialDisplacement,
    InitialVelocity,
    TimeHorizon,
    SampleCount,
}

impl Parameter {
    /// Describes the accepted range.
    #[must_use]
    pub fn requirement(self) -> &'static str {
        match self {
            Self::Mass | Self::Stiffness | Self::TimeHorizon => "finite and positive",
            Self::Damping => "finite and non-negative",
            Self::InitialDisplacement | Self::InitialVelocity => "finite",
            Self::SampleCount => "greater than 1",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mass => "mass",
            Self::Damping => "damping",
            Self::Stiffness => "stiffness",
            Self::InitialDisplacement => "initial displacement",
            Self::InitialVelocity => "initial velocity",
            Self::TimeHorizon => "time horizon",
            Self::SampleCount => "sample count",
        };
        f.write_str(name)
    }
}

/// Identifies a quantity derived from the physical parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Derived {
    NaturalFrequency,
    CriticalDamping,
    DampingRatio,
}

impl fmt::Display for Derived {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NaturalFrequency => "natural frequency",
            Self::CriticalDamping => "critical damping",
            Self::DampingRatio => "damping ratio",
        };
        f.write_str(name)
    }
}

/// A trajectory whose sequences do not have the expected shape.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error(
    "expected {expected} samples, got time = {time}, displacement = {displacement}, velocity = {velocity}"
)]
pub struct TrajectoryShape {
    pub expected: usize,
    pub time: usize,
    pub displacement: usize,
    pub velocity: usize,
}
