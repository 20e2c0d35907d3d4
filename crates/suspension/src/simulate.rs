use sprung_core::Observer;
use sprung_solvers::ode::{self, Action, Config, Event, Grid};

use crate::{
    SimulationRequest, SimulationResult, StateSpace, SuspensionModel,
    error::SimulationError,
    force::{Force, ForceEvaluationError, ZeroForce},
};

/// Simulates `model` for `request` under `force`.
///
/// This is the full form behind [`solve_homogeneous`] and [`solve_forced`].
/// The request is validated, the [`StateSpace`] system is integrated across
/// the request's grid with `config`, and the trajectory is checked before it
/// is returned. The observer sees every accepted integration step and may
/// stop the solve, for example through a deadline or cancellation token.
///
/// # Errors
///
/// - [`SimulationError::InvalidParameter`] for an invalid request.
/// - [`SimulationError::ForceEvaluation`] if the force fails, returns a
///   non-finite value, or is queried at a negative time.
/// - [`SimulationError::Divergence`] if the state becomes non-finite.
/// - [`SimulationError::Cancelled`] if the observer stops the solve.
/// - [`SimulationError::IntegrationFailure`] for any other solver failure.
pub fn solve<F, Obs>(
    model: &SuspensionModel,
    request: &SimulationRequest,
    force: &F,
    config: &Config,
    observer: Obs,
) -> Result<SimulationResult, SimulationError>
where
    F: Force + ?Sized,
    Obs: Observer<Event<2>, Action>,
{
    let grid = request.validate()?;
    let system = StateSpace::new(model, force);

    tracing::debug!(
        samples = grid.len(),
        horizon = grid.end(),
        x0 = request.initial_displacement,
        v0 = request.initial_velocity,
        "starting suspension solve"
    );

    let solution = ode::solve(&system, request.initial_state(), &grid, config, observer)
        .map_err(|err| into_simulation_error(err, &grid))
        .inspect_err(|err| tracing::warn!(error = %err, "suspension solve failed"))?;

    let stats = solution.stats;
    let result = SimulationResult::from_solution(solution, grid.len())
        .inspect_err(|err| tracing::warn!(error = %err, "suspension trajectory rejected"))?;

    tracing::debug!(
        samples = result.len(),
        evaluations = stats.evaluations,
        accepted = stats.accepted_steps,
        rejected = stats.rejected_steps,
        stiff_switch_at = ?stats.stiff_switch_at,
        "finished suspension solve"
    );

    Ok(result)
}

/// Simulates the free response of `model` from `(x0, v0)`.
///
/// Integrates with zero external force over `sample_count` uniform samples on
/// `[0, time_horizon]`, using the default solver configuration.
///
/// # Errors
///
/// See [`solve`].
pub fn solve_homogeneous(
    model: &SuspensionModel,
    initial_displacement: f64,
    initial_velocity: f64,
    time_horizon: f64,
    sample_count: usize,
) -> Result<SimulationResult, SimulationError> {
    solve_forced(
        model,
        initial_displacement,
        initial_velocity,
        &ZeroForce,
        time_horizon,
        sample_count,
    )
}

/// Simulates the response of `model` from `(x0, v0)` to an external force.
///
/// Uses the default solver configuration and no observer.
///
/// # Errors
///
/// See [`solve`].
pub fn solve_forced<F: Force + ?Sized>(
    model: &SuspensionModel,
    initial_displacement: f64,
    initial_velocity: f64,
    force: &F,
    time_horizon: f64,
    sample_count: usize,
) -> Result<SimulationResult, SimulationError> {
    let request = SimulationRequest::new(initial_displacement, initial_velocity)
        .with_time_horizon(time_horizon)
        .with_sample_count(sample_count);

    solve(model, &request, force, &Config::default(), ())
}

fn into_simulation_error(err: ode::Error<ForceEvaluationError>, grid: &Grid) -> SimulationError {
    match err {
        ode::Error::Problem { source, .. } => SimulationError::ForceEvaluation(source),
        ode::Error::NonFiniteState { index, .. } => SimulationError::Divergence {
            index,
            time: grid.time(index),
        },
        ode::Error::Stopped { t } => SimulationError::Cancelled { time: t },
        other => SimulationError::integration(other),
    }
}
