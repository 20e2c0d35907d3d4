use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use sprung_core::Observer;

use crate::traits::CanStopEarly;

/// Stops a solve once a wall-clock instant has passed.
///
/// The deadline is checked each time the solver emits an event, so a single
/// slow derivative evaluation can overrun it by up to one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    /// Creates a deadline `budget` from now.
    #[must_use]
    pub fn after(budget: Duration) -> Self {
        Self::at(Instant::now() + budget)
    }

    /// Creates a deadline at a fixed instant.
    #[must_use]
    pub fn at(expires_at: Instant) -> Self {
        Self { expires_at }
    }

    /// Returns true once the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

impl<E, A: CanStopEarly> Observer<E, A> for Deadline {
    fn observe(&mut self, _event: &E) -> Option<A> {
        self.is_expired().then(A::stop_early)
    }
}

/// A cloneable token that stops a solve from another thread.
///
/// All clones share one flag; cancelling any clone stops every solve
/// observing the token at its next event.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    cancelled: Arc<AtomicBool>,
}

impl Cancellation {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns true if cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl<E, A: CanStopEarly> Observer<E, A> for Cancellation {
    fn observe(&mut self, _event: &E) -> Option<A> {
        self.is_cancelled().then(A::stop_early)
    }
}
