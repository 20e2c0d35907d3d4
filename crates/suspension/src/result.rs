use serde::Serialize;
use sprung_solvers::ode::Solution;

use crate::{
    SuspensionModel,
    error::{SimulationError, TrajectoryShape},
};

/// One output sample of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Time in s.
    pub t: f64,
    /// Displacement in m.
    pub x: f64,
    /// Velocity in m/s.
    pub v: f64,
}

/// A validated suspension trajectory.
///
/// Holds three equal-length sequences sampled on a uniform grid starting at
/// `t = 0`. Every displacement and velocity is finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    time: Vec<f64>,
    displacement: Vec<f64>,
    velocity: Vec<f64>,
}

impl SimulationResult {
    /// Creates a result from raw sequences after validating them.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequences do not all have `time.len()`
    /// entries, or if a displacement or velocity is not finite.
    pub fn new(
        time: Vec<f64>,
        displacement: Vec<f64>,
        velocity: Vec<f64>,
    ) -> Result<Self, SimulationError> {
        validate_trajectory(&time, &displacement, &velocity, time.len())?;
        Ok(Self {
            time,
            displacement,
            velocity,
        })
    }

    /// Unpacks an integrator solution of `[x, v]` states.
    ///
    /// # Errors
    ///
    /// Returns an error if the solution does not have `expected` samples or
    /// contains a non-finite value.
    pub(crate) fn from_solution(
        solution: Solution<2>,
        expected: usize,
    ) -> Result<Self, SimulationError> {
        let (displacement, velocity) = solution.states.iter().map(|&[x, v]| (x, v)).unzip();
        let result = Self {
            time: solution.times,
            displacement,
            velocity,
        };
        validate_trajectory(&result.time, &result.displacement, &result.velocity, expected)?;
        Ok(result)
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Returns true if there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Sample times in s.
    #[must_use]
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Displacements in m.
    #[must_use]
    pub fn displacement(&self) -> &[f64] {
        &self.displacement
    }

    /// Velocities in m/s.
    #[must_use]
    pub fn velocity(&self) -> &[f64] {
        &self.velocity
    }

    /// Iterates over the samples in time order.
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.time
            .iter()
            .zip(&self.displacement)
            .zip(&self.velocity)
            .map(|((&t, &x), &v)| Sample { t, x, v })
    }

    /// Returns the last sample.
    #[must_use]
    pub fn final_sample(&self) -> Option<Sample> {
        self.samples().last()
    }

    /// Returns the largest absolute displacement.
    #[must_use]
    pub fn peak_displacement(&self) -> f64 {
        self.displacement.iter().fold(0.0, |peak, x| x.abs().max(peak))
    }

    /// Estimates the acceleration at each sample from the velocity.
    ///
    /// Interior samples use second-order central differences, which account
    /// for uneven spacing, and the endpoints use one-sided first-order
    /// differences.
    #[must_use]
    pub fn acceleration(&self) -> Vec<f64> {
        let (t, v) = (&self.time, &self.velocity);
        let n = t.len();
        if n < 2 {
            return vec![0.0; n];
        }

        let mut a = Vec::with_capacity(n);
        a.push((v[1] - v[0]) / (t[1] - t[0]));
        for i in 1..n - 1 {
            let h0 = t[i] - t[i - 1];
            let h1 = t[i + 1] - t[i];
            a.push(
                (h0 * h0 * v[i + 1] + (h1 * h1 - h0 * h0) * v[i] - h1 * h1 * v[i - 1])
                    / (h0 * h1 * (h0 + h1)),
            );
        }
        a.push((v[n - 1] - v[n - 2]) / (t[n - 1] - t[n - 2]));
        a
    }

    /// Computes the mechanical energy of `model` at each sample.
    #[must_use]
    pub fn mechanical_energy(&self, model: &SuspensionModel) -> Vec<f64> {
        self.samples()
            .map(|s| model.mechanical_energy(s.x, s.v))
            .collect()
    }
}

/// Checks a trajectory before it is handed to callers.
///
/// The three sequences must each have `expected` entries, and every
/// displacement and velocity must be finite. The first non-finite sample is
/// reported along with its time.
///
/// # Errors
///
/// Returns [`SimulationError::IntegrationFailure`] with a [`TrajectoryShape`]
/// source on a length mismatch, or [`SimulationError::Divergence`] for the
/// first non-finite sample.
pub fn validate_trajectory(
    time: &[f64],
    displacement: &[f64],
    velocity: &[f64],
    expected: usize,
) -> Result<(), SimulationError> {
    let shape = TrajectoryShape {
        expected,
        time: time.len(),
        displacement: displacement.len(),
        velocity: velocity.len(),
    };
    if shape.time != expected || shape.displacement != expected || shape.velocity != expected {
        return Err(SimulationError::integration(shape));
    }

    let diverged = displacement
        .iter()
        .zip(velocity)
        .position(|(x, v)| !x.is_finite() || !v.is_finite());

    match diverged {
        Some(index) => Err(SimulationError::Divergence {
            index,
            time: time[index],
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn linear_grid(n: usize, dt: f64) -> Vec<f64> {
        (0..n).map(|i| i as f64 * dt).collect()
    }

    #[test]
    fn accessors() {
        let result = SimulationResult::new(
            vec![0.0, 0.5, 1.0],
            vec![0.1, -0.3, 0.2],
            vec![0.0, 1.0, 2.0],
        )
        .expect("valid trajectory");

        assert_eq!(result.len(), 3);
        assert!(!result.is_empty());
        assert_relative_eq!(result.peak_displacement(), 0.3);
        assert_eq!(
            result.final_sample(),
            Some(Sample {
                t: 1.0,
                x: 0.2,
                v: 2.0
            })
        );
        assert_eq!(result.samples().count(), 3);
    }

    #[test]
    fn acceleration_is_exact_for_quadratic_velocity() {
        let t = linear_grid(11, 0.1);
        let v: Vec<f64> = t.iter().map(|t| t * t).collect();
        let x = vec![0.0; t.len()];
        let result = SimulationResult::new(t.clone(), x, v).expect("valid trajectory");

        let a = result.acceleration();
        assert_eq!(a.len(), 11);
        for i in 1..10 {
            assert_relative_eq!(a[i], 2.0 * t[i], epsilon = 1e-12);
        }
        // One-sided ends are first order.
        assert_relative_eq!(a[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(a[10], 1.9, epsilon = 1e-12);
    }

    #[test]
    fn energy_per_sample() {
        let model = SuspensionModel::new(2.0, 0.0, 8.0).expect("valid model");
        let result = SimulationResult::new(vec![0.0, 1.0], vec![0.5, 0.0], vec![0.0, 1.0])
            .expect("valid trajectory");

        let energy = result.mechanical_energy(&model);
        assert_relative_eq!(energy[0], 1.0);
        assert_relative_eq!(energy[1], 1.0);
    }

    #[test]
    fn first_non_finite_sample_is_reported() {
        let err = validate_trajectory(
            &[0.0, 0.1, 0.2, 0.3],
            &[0.0, 1.0, f64::INFINITY, f64::NAN],
            &[0.0, f64::NAN, 0.0, 0.0],
            4,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            SimulationError::Divergence { index: 1, time } if time == 0.1
        ));
    }

    #[test]
    fn length_mismatch_is_an_integration_failure() {
        let err = validate_trajectory(&[0.0, 0.1], &[0.0, 0.0], &[0.0], 2).unwrap_err();
        let SimulationError::IntegrationFailure(source) = err else {
            panic!("expected an integration failure");
        };
        assert_eq!(
            source.downcast_ref::<TrajectoryShape>(),
            Some(&TrajectoryShape {
                expected: 2,
                time: 2,
                displacement: 2,
                velocity: 1,
            })
        );
    }

    #[test]
    fn wrong_sample_count_is_an_integration_failure() {
        let err = validate_trajectory(&[0.0, 0.1], &[0.0, 0.0], &[0.0, 0.0], 3).unwrap_err();
        assert!(matches!(err, SimulationError::IntegrationFailure(_)));
    }

    #[test]
    fn new_rejects_divergent_data() {
        assert!(matches!(
            SimulationResult::new(vec![0.0, 1.0], vec![0.0, f64::NAN], vec![0.0, 0.0]),
            Err(SimulationError::Divergence { index: 1, .. })
        ));
    }
}
