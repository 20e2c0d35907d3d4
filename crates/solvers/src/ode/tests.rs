use std::{convert::Infallible, f64::consts::PI};

use approx::assert_abs_diff_eq;
use sprung_core::OdeProblem;
use thiserror::Error;

use super::{Action, Config, Error, Event, Grid, solve, solve_unobserved};

/// Undamped unit oscillator: x'' = -x.
struct Harmonic;

impl OdeProblem<2> for Harmonic {
    type Error = Infallible;

    fn derivative(&self, _t: f64, y: &[f64; 2]) -> Result<[f64; 2], Self::Error> {
        Ok([y[1], -y[0]])
    }
}

/// Exponential decay: y' = -rate * y.
struct Decay {
    rate: f64,
}

impl OdeProblem<1> for Decay {
    type Error = Infallible;

    fn derivative(&self, _t: f64, y: &[f64; 1]) -> Result<[f64; 1], Self::Error> {
        Ok([-self.rate * y[0]])
    }
}

#[derive(Debug, Error)]
#[error("input unavailable after t = {limit}")]
struct Unavailable {
    limit: f64,
}

/// Constant slope that cannot be evaluated past `limit`.
struct FailsAfter {
    limit: f64,
}

impl OdeProblem<1> for FailsAfter {
    type Error = Unavailable;

    fn derivative(&self, t: f64, _y: &[f64; 1]) -> Result<[f64; 1], Self::Error> {
        if t > self.limit {
            Err(Unavailable { limit: self.limit })
        } else {
            Ok([1.0])
        }
    }
}

/// Unit mass and stiffness with damping ratio `zeta`: x'' = -2ζx' - x.
struct Overdamped {
    zeta: f64,
}

impl Overdamped {
    /// Closed-form displacement from rest at `x0`.
    fn displacement(&self, x0: f64, t: f64) -> f64 {
        let root = (self.zeta * self.zeta - 1.0).sqrt();
        let slow = -1.0 / (self.zeta + root);
        let fast = -(self.zeta + root);
        let a = -fast * x0 / (slow - fast);
        a * (slow * t).exp() + (x0 - a) * (fast * t).exp()
    }
}

impl OdeProblem<2> for Overdamped {
    type Error = Infallible;

    fn derivative(&self, _t: f64, y: &[f64; 2]) -> Result<[f64; 2], Self::Error> {
        Ok([y[1], -2.0 * self.zeta * y[1] - y[0]])
    }
}

/// Produces a NaN derivative without reporting an error.
struct Poisoned;

impl OdeProblem<1> for Poisoned {
    type Error = Infallible;

    fn derivative(&self, _t: f64, _y: &[f64; 1]) -> Result<[f64; 1], Self::Error> {
        Ok([f64::NAN])
    }
}

#[test]
fn harmonic_matches_closed_form() {
    let grid = Grid::uniform(0.0, 2.0 * PI, 21).expect("valid grid");
    let solution =
        solve_unobserved(&Harmonic, [1.0, 0.0], &grid, &Config::default()).expect("should solve");

    assert_eq!(solution.len(), 21);
    for state in solution.iter() {
        assert_abs_diff_eq!(state.y[0], state.t.cos(), epsilon = 1e-6);
        assert_abs_diff_eq!(state.y[1], -state.t.sin(), epsilon = 1e-6);
    }
}

#[test]
fn first_sample_is_initial_state() {
    let grid = Grid::uniform(0.0, 1.0, 5).expect("valid grid");
    let solution = solve_unobserved(&Harmonic, [0.25, -3.0], &grid, &Config::default())
        .expect("should solve");

    assert_eq!(solution.times[0], 0.0);
    assert_eq!(solution.states[0], [0.25, -3.0]);
    assert_eq!(solution.times[4], 1.0);
}

#[test]
fn decay_matches_exponential() {
    let grid = Grid::uniform(0.0, 5.0, 51).expect("valid grid");
    let solution = solve_unobserved(&Decay { rate: 1.0 }, [2.0], &grid, &Config::default())
        .expect("should solve");

    for state in solution.iter() {
        assert_abs_diff_eq!(state.y[0], 2.0 * (-state.t).exp(), epsilon = 1e-7);
    }
}

#[test]
fn stiff_decay_stays_stable() {
    let grid = Grid::uniform(0.0, 1.0, 11).expect("valid grid");
    let solution = solve_unobserved(&Decay { rate: 500.0 }, [1.0], &grid, &Config::default())
        .expect("should solve");

    for state in solution.iter().skip(1) {
        assert_abs_diff_eq!(state.y[0], 0.0, epsilon = 1e-6);
    }
    assert!(solution.stats.accepted_steps > 10);
}

#[test]
fn rk4_matches_closed_form() {
    let grid = Grid::uniform(0.0, 2.0 * PI, 101).expect("valid grid");
    let config = Config::rk4(4).expect("valid config");
    let solution = solve_unobserved(&Harmonic, [1.0, 0.0], &grid, &config).expect("should solve");

    assert_eq!(solution.stats.accepted_steps, 400);
    assert_eq!(solution.stats.evaluations, 4 * solution.stats.accepted_steps);
    for state in solution.iter() {
        assert_abs_diff_eq!(state.y[0], state.t.cos(), epsilon = 1e-8);
    }
}

#[test]
fn dop853_matches_closed_form() {
    let grid = Grid::uniform(0.0, 2.0 * PI, 41).expect("valid grid");
    let config = Config::dop853(1e-10, 1e-10).expect("valid config");
    let solution = solve_unobserved(&Harmonic, [1.0, 0.0], &grid, &config).expect("should solve");

    for state in solution.iter() {
        assert_abs_diff_eq!(state.y[0], state.t.cos(), epsilon = 1e-8);
        assert_abs_diff_eq!(state.y[1], -state.t.sin(), epsilon = 1e-8);
    }
    assert_eq!(solution.stats.stiff_switch_at, None);
}

#[test]
fn tr_bdf2_matches_closed_form() {
    let grid = Grid::uniform(0.0, 5.0, 51).expect("valid grid");
    let config = Config::tr_bdf2(1e-10, 1e-10).expect("valid config");
    let solution =
        solve_unobserved(&Decay { rate: 1.0 }, [2.0], &grid, &config).expect("should solve");

    for state in solution.iter() {
        assert_abs_diff_eq!(state.y[0], 2.0 * (-state.t).exp(), epsilon = 1e-6);
    }

    let problem = Overdamped { zeta: 2.0 };
    let solution = solve_unobserved(&problem, [0.1, 0.0], &grid, &config).expect("should solve");
    for state in solution.iter() {
        assert_abs_diff_eq!(state.y[0], problem.displacement(0.1, state.t), epsilon = 1e-6);
    }
}

#[test]
fn tr_bdf2_handles_very_stiff_decay() {
    let grid = Grid::uniform(0.0, 1.0, 11).expect("valid grid");
    let config = Config::tr_bdf2(1e-8, 1e-8).expect("valid config");
    let solution =
        solve_unobserved(&Decay { rate: 1e9 }, [1.0], &grid, &config).expect("should solve");

    for state in solution.iter().skip(1) {
        assert_abs_diff_eq!(state.y[0], 0.0, epsilon = 1e-8);
    }
    assert!(solution.stats.accepted_steps < 1_000);
}

#[test]
fn heavy_overdamping_falls_back_to_tr_bdf2() {
    let problem = Overdamped { zeta: 1e6 };
    let grid = Grid::uniform(0.0, 10.0, 101).expect("valid grid");
    let solution = solve_unobserved(&problem, [0.1, 0.0], &grid, &Config::default())
        .expect("should solve");

    let switched = solution.stats.stiff_switch_at.expect("should switch");
    assert!(switched <= 0.1, "switched at t = {switched}");
    for state in solution.iter() {
        assert_abs_diff_eq!(state.y[0], problem.displacement(0.1, state.t), epsilon = 1e-6);
    }
    assert!(solution.stats.accepted_steps < 200_000);
}

#[test]
fn explicit_failure_without_fallback_is_reported() {
    let problem = Overdamped { zeta: 1e7 };
    let grid = Grid::uniform(0.0, 10.0, 101).expect("valid grid");
    let config = Config::default().without_stiff_fallback();

    let result = solve_unobserved(&problem, [0.1, 0.0], &grid, &config);
    assert!(
        matches!(result, Err(Error::Integration { t, .. }) if t == 0.0),
        "got {result:?}"
    );
}

#[test]
fn tiny_time_spans_are_integrated() {
    let grid = Grid::uniform(0.0, 1e-12, 1000).expect("valid grid");

    for config in [
        Config::default(),
        Config::tr_bdf2(1e-8, 1e-8).expect("valid config"),
    ] {
        let solution =
            solve_unobserved(&Harmonic, [1.0, 0.0], &grid, &config).expect("should solve");

        assert_eq!(solution.len(), 1000);
        assert_eq!(solution.times[999], 1e-12);
        assert_abs_diff_eq!(solution.states[999][0], 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(solution.states[999][1], -1e-12, epsilon = 1e-18);
    }
}

#[test]
fn identical_inputs_give_identical_output() {
    let grid = Grid::uniform(0.0, 10.0, 200).expect("valid grid");
    let config = Config::default();

    let first = solve_unobserved(&Harmonic, [0.1, 0.0], &grid, &config).expect("should solve");
    let second = solve_unobserved(&Harmonic, [0.1, 0.0], &grid, &config).expect("should solve");

    assert_eq!(first, second);
}

#[test]
fn problem_error_aborts_with_time() {
    let grid = Grid::uniform(0.0, 1.0, 11).expect("valid grid");
    let result = solve_unobserved(&FailsAfter { limit: 0.45 }, [0.0], &grid, &Config::default());

    match result {
        Err(Error::Problem { t, source }) => {
            assert!(t > 0.45 && t <= 0.5, "failed at t = {t}");
            assert_abs_diff_eq!(source.limit, 0.45);
        }
        other => panic!("expected problem error, got {other:?}"),
    }
}

#[test]
fn rejects_non_finite_initial_state() {
    let grid = Grid::uniform(0.0, 1.0, 3).expect("valid grid");
    let result = solve_unobserved(&Harmonic, [0.0, f64::INFINITY], &grid, &Config::default());

    assert!(matches!(
        result,
        Err(Error::NonFiniteInitialState { index: 1, .. })
    ));
}

#[test]
fn nan_derivative_is_divergence() {
    let grid = Grid::uniform(0.0, 1.0, 3).expect("valid grid");

    let result = solve_unobserved(&Poisoned, [1.0], &grid, &Config::default());
    assert!(matches!(
        result,
        Err(Error::NonFiniteState { index: 1, .. })
    ));

    let result = solve_unobserved(&Poisoned, [1.0], &grid, &Config::rk4(2).unwrap());
    assert!(matches!(
        result,
        Err(Error::NonFiniteState { index: 1, .. })
    ));
}

#[test]
fn step_budget_is_enforced() {
    let grid = Grid::uniform(0.0, 10.0, 1000).expect("valid grid");
    let config = Config::default().with_max_steps(50).expect("valid config");

    let result = solve_unobserved(&Harmonic, [1.0, 0.0], &grid, &config);
    assert!(matches!(
        result,
        Err(Error::MaxStepsExceeded { max_steps: 50, .. })
    ));
}

#[test]
fn observer_can_stop_solve() {
    let grid = Grid::uniform(0.0, 10.0, 101).expect("valid grid");

    let mut calls = 0;
    let observer = |event: &Event<2>| {
        calls += 1;
        if event.step >= 3 {
            Some(Action::StopEarly)
        } else {
            None
        }
    };

    let result = solve(&Harmonic, [1.0, 0.0], &grid, &Config::default(), observer);

    assert!(matches!(result, Err(Error::Stopped { .. })));
    assert_eq!(calls, 3);
}

#[test]
fn events_are_numbered_and_ordered() {
    let grid = Grid::uniform(0.0, 1.0, 5).expect("valid grid");
    let config = Config::rk4(2).expect("valid config");

    let mut events = Vec::new();
    solve(
        &Harmonic,
        [1.0, 0.0],
        &grid,
        &config,
        |event: &Event<2>| {
            events.push(*event);
            None
        },
    )
    .expect("should solve");

    let steps: Vec<usize> = events.iter().map(|e| e.step).collect();
    assert_eq!(steps, (1..=8).collect::<Vec<_>>());
    assert!(events.windows(2).all(|w| w[0].t < w[1].t));
    assert_eq!(events.last().map(|e| e.t), Some(1.0));
}
