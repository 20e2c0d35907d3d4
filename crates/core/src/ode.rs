/// A system of first-order ordinary differential equations with `N` states.
///
/// The problem maps the independent variable `t` and the current state `y` to
/// the state derivative `dy/dt`. Evaluation may fail, for example when an
/// external input cannot be computed at `t`, and solvers are expected to
/// abort on the first failure.
///
/// Implementations should be pure: adaptive solvers re-evaluate the same or
/// nearby points after rejecting a step, and must see identical results.
pub trait OdeProblem<const N: usize> {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Computes `dy/dt` at `(t, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the derivative cannot be evaluated.
    fn derivative(&self, t: f64, y: &[f64; N]) -> Result<[f64; N], Self::Error>;
}

/// The state of an ODE system at a given point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State<const N: usize> {
    /// The independent variable (typically time).
    pub t: f64,

    /// The dependent variables at `t`.
    ///
    /// The order of values matches the array returned by
    /// [`OdeProblem::derivative`].
    pub y: [f64; N],
}

impl<const N: usize> State<N> {
    /// Creates a state at `t` with values `y`.
    #[must_use]
    pub fn new(t: f64, y: [f64; N]) -> Self {
        Self { t, y }
    }

    /// Returns true if `t` and every state value are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.t.is_finite() && self.y.iter().all(|v| v.is_finite())
    }
}
