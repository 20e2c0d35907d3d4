/// Control actions supported by the ODE solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Abort the solve.
    ///
    /// The solver returns [`Error::Stopped`](super::Error::Stopped) rather
    /// than a truncated solution.
    StopEarly,
}
