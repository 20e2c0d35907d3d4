use std::{cell::RefCell, rc::Rc};

use ode_solvers::{SVector, System, dop_shared::IntegrationError};
use sprung_core::{Observer, OdeProblem, State};

use super::{Action, Error, Event, driver::Driver};

/// Fraction of a grid interval the last output may miss its end by.
const LANDING: f64 = 1e-9;

/// Explicit methods provided by `ode_solvers`.
#[derive(Debug, Clone, Copy)]
pub(super) enum Explicit {
    Rk4 { substeps: usize },
    Dopri5 { abs_tol: f64, rel_tol: f64 },
    Dop853 { abs_tol: f64, rel_tol: f64 },
}

/// How a grid interval ended for an explicit method.
pub(super) enum Advance<const N: usize> {
    Reached { state: State<N>, steps: usize },
    GaveUp(IntegrationError),
}

impl Explicit {
    /// Returns true for methods with error control.
    pub(super) fn is_adaptive(self) -> bool {
        !matches!(self, Self::Rk4 { .. })
    }

    /// Integrates one grid interval from `from` to `target`.
    ///
    /// Each interval is a fresh `ode_solvers` run, so accepted steps land on
    /// `target` and no dense output is involved.
    pub(super) fn advance<P, Obs, const N: usize>(
        self,
        driver: &mut Driver<'_, P, Obs, N>,
        from: State<N>,
        target: f64,
        index: usize,
    ) -> Result<Advance<N>, Error<P::Error>>
    where
        P: OdeProblem<N>,
        Obs: Observer<Event<N>, Action>,
    {
        let log = Rc::new(RefCell::new(Log::default()));
        let system = Adapter {
            problem: driver.problem(),
            log: Rc::clone(&log),
        };

        let y_start: SVector<f64, N> = from.y.into();
        let span = target - from.t;

        // A zero output step asks for one output per accepted step.
        let outcome = match self {
            Self::Rk4 { substeps } => {
                let h = rk4_step(span, substeps);
                let mut stepper = ode_solvers::Rk4::new(system, from.t, y_start, target, h);
                stepper.integrate().map(|stats| {
                    let steps = outputs(stepper.x_out(), stepper.y_out(), from.t);
                    (stats.rejected_steps, steps)
                })
            }
            Self::Dopri5 { abs_tol, rel_tol } => {
                let mut stepper = ode_solvers::Dopri5::new(
                    system, from.t, target, 0.0, y_start, rel_tol, abs_tol,
                );
                stepper.integrate().map(|stats| {
                    let steps = outputs(stepper.x_out(), stepper.y_out(), from.t);
                    (stats.rejected_steps, steps)
                })
            }
            Self::Dop853 { abs_tol, rel_tol } => {
                let mut stepper = ode_solvers::Dop853::new(
                    system, from.t, target, 0.0, y_start, rel_tol, abs_tol,
                );
                stepper.integrate().map(|stats| {
                    let steps = outputs(stepper.x_out(), stepper.y_out(), from.t);
                    (stats.rejected_steps, steps)
                })
            }
        };

        let Log {
            evaluations,
            error,
            non_finite,
        } = log.take();
        driver.count_evaluations(evaluations);

        if let Some((t, source)) = error {
            return Err(Error::Problem { t, source });
        }

        let (rejected, steps) = match outcome {
            Ok(done) => done,
            Err(_) if non_finite => return Err(Error::NonFiniteState { t: from.t, index }),
            Err(source) => return Ok(Advance::GaveUp(source)),
        };

        for _ in 0..rejected {
            driver.attempt(from.t)?;
            driver.reject();
        }

        let Some(&last) = steps.last() else {
            return Err(Error::Stalled { t: from.t, index });
        };
        if last.y.iter().any(|v| !v.is_finite()) {
            return Err(Error::NonFiniteState { t: from.t, index });
        }
        if (target - last.t).abs() > LANDING * span {
            return Err(Error::Stalled { t: last.t, index });
        }

        let mut previous = from.t;
        for (i, step) in steps.iter().enumerate() {
            let t = if i + 1 == steps.len() { target } else { step.t };
            driver.attempt(t)?;
            driver.accept(State::new(t, step.y), t - previous)?;
            previous = t;
        }

        Ok(Advance::Reached {
            state: State::new(target, last.y),
            steps: steps.len(),
        })
    }
}

/// Returns a step that covers `span` in exactly `substeps` steps.
///
/// `ode_solvers` rounds the step count up, so a quotient that rounds just
/// above `substeps` would add a step past the grid time.
fn rk4_step(span: f64, substeps: usize) -> f64 {
    let count = substeps as f64;
    let h = span / count;
    if span / h > count {
        h * (1.0 + f64::EPSILON)
    } else {
        h
    }
}

/// Collects the outputs after `start`, dropping the echoed initial point.
fn outputs<const N: usize>(
    x_out: &[f64],
    y_out: &[SVector<f64, N>],
    start: f64,
) -> Vec<State<N>> {
    x_out
        .iter()
        .zip(y_out)
        .filter(|&(&x, _)| x > start)
        .map(|(&x, y)| State::new(x, (*y).into()))
        .collect()
}

/// What happened inside `ode_solvers` during one grid interval.
struct Log<E> {
    evaluations: usize,
    error: Option<(f64, E)>,
    non_finite: bool,
}

impl<E> Default for Log<E> {
    fn default() -> Self {
        Self {
            evaluations: 0,
            error: None,
            non_finite: false,
        }
    }
}

/// Adapts an [`OdeProblem`] into an `ode_solvers` system.
struct Adapter<'a, P: OdeProblem<N>, const N: usize> {
    problem: &'a P,
    log: Rc<RefCell<Log<P::Error>>>,
}

impl<P: OdeProblem<N>, const N: usize> System<f64, SVector<f64, N>> for Adapter<'_, P, N> {
    fn system(&self, x: f64, y: &SVector<f64, N>, dy: &mut SVector<f64, N>) {
        let mut log = self.log.borrow_mut();
        log.evaluations += 1;

        // Once a call has failed, the rest of the run is discarded.
        if log.error.is_some() {
            *dy = SVector::from_element(f64::NAN);
            return;
        }

        let state: [f64; N] = (*y).into();
        match self.problem.derivative(x, &state) {
            Ok(derivative) => {
                if state.iter().chain(&derivative).any(|v| !v.is_finite()) {
                    log.non_finite = true;
                }
                *dy = SVector::from_row_slice(&derivative);
            }
            Err(source) => {
                log.error = Some((x, source));
                *dy = SVector::from_element(f64::NAN);
            }
        }
    }

    fn solout(&mut self, _x: f64, _y: &SVector<f64, N>, _dy: &SVector<f64, N>) -> bool {
        self.log.borrow().error.is_some()
    }
}
