use serde::{Deserialize, Serialize};
use sprung_solvers::ode::Grid;

use crate::{
    error::{Parameter, SimulationError},
    parameters::require,
};

/// Default simulated duration in seconds.
pub const DEFAULT_TIME_HORIZON: f64 = 10.0;

/// Default number of output samples.
pub const DEFAULT_SAMPLE_COUNT: usize = 1000;

/// The inputs of a single solve: initial state and output grid.
///
/// Fields omitted when deserializing take their defaults (zero initial state,
/// a 10 s horizon, and 1000 samples).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationRequest {
    /// Initial displacement `x0` in m.
    pub initial_displacement: f64,
    /// Initial velocity `v0` in m/s.
    pub initial_velocity: f64,
    /// Simulated duration `t_max` in s.
    pub time_horizon: f64,
    /// Number of output samples `n`, including both endpoints.
    pub sample_count: usize,
}

impl Default for SimulationRequest {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl SimulationRequest {
    /// Creates a request from an initial state with the default grid.
    #[must_use]
    pub fn new(initial_displacement: f64, initial_velocity: f64) -> Self {
        Self {
            initial_displacement,
            initial_velocity,
            time_horizon: DEFAULT_TIME_HORIZON,
            sample_count: DEFAULT_SAMPLE_COUNT,
        }
    }

    /// Sets the simulated duration.
    #[must_use]
    pub fn with_time_horizon(mut self, time_horizon: f64) -> Self {
        self.time_horizon = time_horizon;
        self
    }

    /// Sets the number of output samples.
    #[must_use]
    pub fn with_sample_count(mut self, sample_count: usize) -> Self {
        self.sample_count = sample_count;
        self
    }

    /// Checks the request and builds its output grid on `[0, t_max]`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidParameter`] if the initial state is
    /// not finite, the horizon is not finite and positive, or fewer than two
    /// samples are requested.
    pub fn validate(&self) -> Result<Grid, SimulationError> {
        require(
            Parameter::InitialDisplacement,
            self.initial_displacement,
            true,
        )?;
        require(Parameter::InitialVelocity, self.initial_velocity, true)?;
        require(
            Parameter::TimeHorizon,
            self.time_horizon,
            self.time_horizon > 0.0,
        )?;

        if self.sample_count < 2 {
            #[allow(clippy::cast_precision_loss)]
            let value = self.sample_count as f64;
            return Err(SimulationError::InvalidParameter {
                field: Parameter::SampleCount,
                value,
            });
        }

        Grid::uniform(0.0, self.time_horizon, self.sample_count)
            .map_err(SimulationError::integration)
    }

    pub(crate) fn initial_state(&self) -> [f64; 2] {
        [self.initial_displacement, self.initial_velocity]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected_field(request: SimulationRequest) -> Option<Parameter> {
        match request.validate() {
            Err(SimulationError::InvalidParameter { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn valid_request_builds_grid() {
        let grid = SimulationRequest::new(0.1, 0.0)
            .with_time_horizon(5.0)
            .with_sample_count(1000)
            .validate()
            .expect("valid request");

        assert_eq!(grid.len(), 1000);
        assert_eq!(grid.start(), 0.0);
        assert_eq!(grid.end(), 5.0);
    }

    #[test]
    fn defaults() {
        let request = SimulationRequest::default();
        assert_eq!(request.time_horizon, DEFAULT_TIME_HORIZON);
        assert_eq!(request.sample_count, DEFAULT_SAMPLE_COUNT);
        assert_eq!(request.initial_state(), [0.0, 0.0]);
    }

    #[test]
    fn rejects_each_field() {
        let base = SimulationRequest::new(0.0, 0.0);

        assert_eq!(
            rejected_field(SimulationRequest::new(f64::NAN, 0.0)),
            Some(Parameter::InitialDisplacement)
        );
        assert_eq!(
            rejected_field(SimulationRequest::new(0.0, f64::INFINITY)),
            Some(Parameter::InitialVelocity)
        );
        assert_eq!(
            rejected_field(base.with_time_horizon(0.0)),
            Some(Parameter::TimeHorizon)
        );
        assert_eq!(
            rejected_field(base.with_time_horizon(-1.0)),
            Some(Parameter::TimeHorizon)
        );
        assert_eq!(
            rejected_field(base.with_time_horizon(f64::INFINITY)),
            Some(Parameter::TimeHorizon)
        );
        assert_eq!(
            rejected_field(base.with_sample_count(1)),
            Some(Parameter::SampleCount)
        );
        assert_eq!(
            rejected_field(base.with_sample_count(0)),
            Some(Parameter::SampleCount)
        );
    }

    #[test]
    fn two_samples_are_enough() {
        let grid = SimulationRequest::new(0.0, 0.0)
            .with_sample_count(2)
            .validate()
            .expect("valid request");
        assert_eq!(grid.times().collect::<Vec<_>>(), vec![0.0, 10.0]);
    }
}
