use sprung_core::State;

/// Counters collected during a solve.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stats {
    /// Number of derivative evaluations.
    pub evaluations: usize,
    /// Number of accepted steps.
    pub accepted_steps: usize,
    /// Number of rejected steps.
    pub rejected_steps: usize,
    /// Start of the grid interval where the solve fell back to TR-BDF2.
    pub stiff_switch_at: Option<f64>,
}

/// The result of an ODE integration over a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<const N: usize> {
    /// Grid times, one per sample.
    pub times: Vec<f64>,

    /// State at each grid time.
    pub states: Vec<[f64; N]>,

    /// Solver counters.
    pub stats: Stats,
}

impl<const N: usize> Solution<N> {
    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns true if the solution has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Iterates over the samples as [`State`]s.
    pub fn iter(&self) -> impl Iterator<Item = State<N>> + '_ {
        self.times
            .iter()
            .zip(&self.states)
            .map(|(&t, &y)| State::new(t, y))
    }
}
