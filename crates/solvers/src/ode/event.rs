/// Event emitted by the ODE solver after each accepted step.
///
/// Step numbers start at 1 and count accepted steps across the whole solve,
/// not grid samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event<const N: usize> {
    /// The accepted step number.
    pub step: usize,

    /// Time at the end of the accepted step.
    pub t: f64,

    /// State at the end of the accepted step.
    pub y: [f64; N],

    /// Size of the accepted step.
    pub h: f64,
}
