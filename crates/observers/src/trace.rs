use sprung_core::Observer;
use sprung_solvers::ode;

/// Emits a `trace`-level event for every accepted ODE step.
///
/// Never requests an action. Install a `tracing` subscriber with the
/// `TRACE` level enabled for the `sprung_observers` target to see output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceSteps;

impl<const N: usize> Observer<ode::Event<N>, ode::Action> for TraceSteps {
    fn observe(&mut self, event: &ode::Event<N>) -> Option<ode::Action> {
        tracing::trace!(
            step = event.step,
            t = event.t,
            h = event.h,
            y = ?event.y,
            "accepted step"
        );
        None
    }
}
