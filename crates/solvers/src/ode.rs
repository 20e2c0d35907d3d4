//! Integration of ODE problems over a uniform output grid.
//!
//! The solver advances an [`OdeProblem`] from an initial state and reports
//! the state at every time of a [`Grid`]:
//!
//! ```text
//! y(t₀) = y₀,   dy/dt = f(t, y),   t₀ < t₁ < … < tₙ₋₁
//! ```
//!
//! # Methods
//!
//! - [`Method::Dopri5`] (default) — adaptive Dormand–Prince 5(4) from
//!   `ode_solvers`.
//! - [`Method::Dop853`] — adaptive Dormand–Prince 8(5,3) from `ode_solvers`.
//! - [`Method::Rk4`] — fixed-step RK4 from `ode_solvers` with a set number of
//!   sub-steps per grid interval.
//! - [`Method::TrBdf2`] — adaptive, L-stable TR-BDF2 for stiff problems.
//!
//! Explicit methods run once per grid interval, so every grid time is landed
//! on exactly and no interpolation is involved. When an adaptive explicit
//! method detects stiffness, exhausts its internal step limit, or needs more
//! than [`STIFF_STEPS_PER_SAMPLE`] steps for one interval, the solve switches
//! to TR-BDF2 for the rest of the grid (see [`Config::without_stiff_fallback`]).
//! The switch is reported in [`Stats::stiff_switch_at`].
//!
//! All methods are deterministic: the same problem, initial state, grid and
//! config always produce bit-identical output.
//!
//! # Observer
//!
//! The observer receives an [`Event`] after every accepted step and may return
//! [`Action::StopEarly`] to abort. An aborted solve returns
//! [`Error::Stopped`]; a partial solution is never returned.
//!
//! # Example
//!
//! ```ignore
//! use sprung_solvers::ode::{self, Config, Grid};
//!
//! let grid = Grid::uniform(0.0, 10.0, 1001)?;
//! let solution = ode::solve_unobserved(&problem, [1.0, 0.0], &grid, &Config::default())?;
//!
//! for state in solution.iter() {
//!     println!("t={}: {:?}", state.t, state.y);
//! }
//! ```

mod action;
mod config;
mod driver;
mod error;
mod event;
mod explicit;
mod grid;
mod solution;
mod tr_bdf2;

#[cfg(test)]
mod tests;

pub use action::Action;
pub use config::{Config, ConfigError, DEFAULT_MAX_STEPS, DEFAULT_TOLERANCE, Method};
pub use error::Error;
pub use event::Event;
pub use grid::{Grid, GridError};
pub use solution::{Solution, Stats};

use sprung_core::{Observer, OdeProblem, State};

use driver::Driver;
use explicit::{Advance, Explicit};
use tr_bdf2::TrBdf2;

/// Accepted explicit steps for one grid interval beyond which the solve
/// treats the problem as stiff.
pub const STIFF_STEPS_PER_SAMPLE: usize = 2_000;

/// The stepping method selected by a [`Config`].
///
/// Starts explicit unless TR-BDF2 was asked for, and drops to TR-BDF2 at
/// most once.
struct Stepper<const N: usize> {
    explicit: Option<Explicit>,
    stiff: TrBdf2<N>,
    fallback: bool,
}

impl<const N: usize> Stepper<N> {
    fn from_config(config: &Config) -> Self {
        let (explicit, abs_tol, rel_tol) = match config.method() {
            Method::Rk4 { substeps } => (
                Some(Explicit::Rk4 { substeps }),
                DEFAULT_TOLERANCE,
                DEFAULT_TOLERANCE,
            ),
            Method::Dopri5 { abs_tol, rel_tol } => {
                (Some(Explicit::Dopri5 { abs_tol, rel_tol }), abs_tol, rel_tol)
            }
            Method::Dop853 { abs_tol, rel_tol } => {
                (Some(Explicit::Dop853 { abs_tol, rel_tol }), abs_tol, rel_tol)
            }
            Method::TrBdf2 { abs_tol, rel_tol } => (None, abs_tol, rel_tol),
        };

        Self {
            fallback: config.stiff_fallback() && explicit.is_some_and(Explicit::is_adaptive),
            explicit,
            stiff: TrBdf2::new(abs_tol, rel_tol),
        }
    }

    fn advance<P, Obs>(
        &mut self,
        driver: &mut Driver<'_, P, Obs, N>,
        from: State<N>,
        target: f64,
        index: usize,
    ) -> Result<State<N>, Error<P::Error>>
    where
        P: OdeProblem<N>,
        Obs: Observer<Event<N>, Action>,
    {
        let Some(explicit) = self.explicit else {
            return self.stiff.advance(driver, from, target, index);
        };

        match explicit.advance(driver, from, target, index)? {
            Advance::Reached { state, steps } => {
                if self.fallback && steps > STIFF_STEPS_PER_SAMPLE {
                    self.switch(driver, target);
                }
                Ok(state)
            }
            Advance::GaveUp(source) if !self.fallback => {
                Err(Error::Integration { t: from.t, source })
            }
            Advance::GaveUp(_) => {
                self.switch(driver, from.t);
                self.stiff.advance(driver, from, target, index)
            }
        }
    }

    fn switch<P, Obs>(&mut self, driver: &mut Driver<'_, P, Obs, N>, t: f64)
    where
        P: OdeProblem<N>,
        Obs: Observer<Event<N>, Action>,
    {
        self.explicit = None;
        driver.switch_to_stiff(t);
    }
}

/// Integrates `problem` from `initial` at `grid.start()` across the grid.
///
/// The returned solution holds exactly one state per grid time, starting with
/// `initial` itself.
///
/// # Errors
///
/// Returns an error if the initial state is non-finite, a derivative
/// evaluation fails, the state diverges, the step size or step budget is
/// exhausted, an explicit run fails with the stiff fallback disabled, or the
/// observer stops the solve.
pub fn solve<P, Obs, const N: usize>(
    problem: &P,
    initial: [f64; N],
    grid: &Grid,
    config: &Config,
    observer: Obs,
) -> Result<Solution<N>, Error<P::Error>>
where
    P: OdeProblem<N>,
    Obs: Observer<Event<N>, Action>,
{
    if let Some((index, &value)) = initial.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(Error::NonFiniteInitialState { index, value });
    }

    let mut driver = Driver::new(problem, observer, config.max_steps());
    let mut stepper = Stepper::from_config(config);

    let mut states = Vec::with_capacity(grid.len());
    states.push(initial);

    let mut current = State::new(grid.start(), initial);
    for (index, target) in grid.times().enumerate().skip(1) {
        current = stepper.advance(&mut driver, current, target, index)?;
        states.push(current.y);
    }

    let times: Vec<f64> = grid.times().collect();
    if states.len() != times.len() {
        return Err(Error::Length {
            expected: times.len(),
            actual: states.len(),
        });
    }

    Ok(Solution {
        times,
        states,
        stats: driver.into_stats(),
    })
}

/// Integrates `problem` across the grid without observation.
///
/// This is a convenience wrapper around [`solve`] that discards events.
///
/// # Errors
///
/// Returns an error under the same conditions as [`solve`], except that it is
/// never stopped by an observer.
pub fn solve_unobserved<P, const N: usize>(
    problem: &P,
    initial: [f64; N],
    grid: &Grid,
    config: &Config,
) -> Result<Solution<N>, Error<P::Error>>
where
    P: OdeProblem<N>,
{
    solve(problem, initial, grid, config, ())
}
