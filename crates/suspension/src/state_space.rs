use sprung_core::OdeProblem;

use crate::{
    SuspensionModel,
    force::{Force, ForceEvaluationError, ForceEvaluator},
};

/// The suspension written as a first-order system in `[x, v]`.
///
/// ```text
/// x' = v
/// v' = (F(t) − c·v − k·x) / m
/// ```
///
/// Holds only references, so one instance can be driven any number of times.
#[derive(Debug)]
pub struct StateSpace<'a, F: ?Sized> {
    model: &'a SuspensionModel,
    force: ForceEvaluator<'a, F>,
}

impl<'a, F: Force + ?Sized> StateSpace<'a, F> {
    /// Builds the system for `model` driven by `force`.
    #[must_use]
    pub fn new(model: &'a SuspensionModel, force: &'a F) -> Self {
        Self {
            model,
            force: ForceEvaluator::new(force),
        }
    }
}

impl<F: Force + ?Sized> OdeProblem<2> for StateSpace<'_, F> {
    type Error = ForceEvaluationError;

    fn derivative(&self, t: f64, y: &[f64; 2]) -> Result<[f64; 2], Self::Error> {
        let [x, v] = *y;
        let force = self.force.evaluate(t)?;

        let m = self.model.mass();
        let c = self.model.damping();
        let k = self.model.stiffness();

        Ok([v, (force - c * v - k * x) / m])
    }
}
