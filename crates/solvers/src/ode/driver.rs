use sprung_core::{Observer, OdeProblem, State};

use super::{Action, Error, Event, Stats};

/// Shared bookkeeping for the stepping methods.
///
/// Wraps derivative evaluation, step budgeting, and observer notification so
/// each method only implements its stepping formula and step-size policy.
pub(super) struct Driver<'a, P, Obs, const N: usize> {
    problem: &'a P,
    observer: Obs,
    max_steps: usize,
    attempts: usize,
    stats: Stats,
}

impl<'a, P, Obs, const N: usize> Driver<'a, P, Obs, N>
where
    P: OdeProblem<N>,
    Obs: Observer<Event<N>, Action>,
{
    pub(super) fn new(problem: &'a P, observer: Obs, max_steps: usize) -> Self {
        Self {
            problem,
            observer,
            max_steps,
            attempts: 0,
            stats: Stats::default(),
        }
    }

    pub(super) fn problem(&self) -> &'a P {
        self.problem
    }

    /// Evaluates the derivative, counting the call.
    pub(super) fn eval(&mut self, t: f64, y: &[f64; N]) -> Result<[f64; N], Error<P::Error>> {
        self.stats.evaluations += 1;
        self.problem
            .derivative(t, y)
            .map_err(|source| Error::Problem { t, source })
    }

    /// Charges one attempted step against the budget.
    pub(super) fn attempt(&mut self, t: f64) -> Result<(), Error<P::Error>> {
        if self.attempts >= self.max_steps {
            return Err(Error::MaxStepsExceeded {
                t,
                max_steps: self.max_steps,
            });
        }
        self.attempts += 1;
        Ok(())
    }

    /// Adds evaluations made outside [`Driver::eval`].
    pub(super) fn count_evaluations(&mut self, evaluations: usize) {
        self.stats.evaluations += evaluations;
    }

    /// Records an accepted step and lets the observer react to it.
    pub(super) fn accept(&mut self, state: State<N>, h: f64) -> Result<(), Error<P::Error>> {
        self.stats.accepted_steps += 1;

        let event = Event {
            step: self.stats.accepted_steps,
            t: state.t,
            y: state.y,
            h,
        };

        match self.observer.observe(&event) {
            Some(Action::StopEarly) => Err(Error::Stopped { t: state.t }),
            None => Ok(()),
        }
    }

    pub(super) fn reject(&mut self) {
        self.stats.rejected_steps += 1;
    }

    pub(super) fn switch_to_stiff(&mut self, t: f64) {
        self.stats.stiff_switch_at = Some(t);
    }

    pub(super) fn into_stats(self) -> Stats {
        self.stats
    }
}
