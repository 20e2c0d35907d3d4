use thiserror::Error;

/// Errors that can occur when creating a [`Grid`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum GridError {
    #[error("grid bounds must be finite: start = {start}, end = {end}")]
    NonFinite { start: f64, end: f64 },

    #[error("grid end {end} must be greater than start {start}")]
    NotIncreasing { start: f64, end: f64 },

    #[error("grid needs at least 2 samples, got {samples}")]
    TooFewSamples { samples: usize },
}

/// A uniform grid of output times.
///
/// Sample `i` sits at `start + (end - start) * i / (samples - 1)`. The first
/// sample is exactly `start` and the last is exactly `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    start: f64,
    end: f64,
    samples: usize,
}

impl Grid {
    /// Creates a uniform grid spanning `[start, end]` with `samples` points.
    ///
    /// # Errors
    ///
    /// Returns an error if a bound is non-finite, `end <= start`, or
    /// `samples < 2`.
    pub fn uniform(start: f64, end: f64, samples: usize) -> Result<Self, GridError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(GridError::NonFinite { start, end });
        }
        if end <= start {
            return Err(GridError::NotIncreasing { start, end });
        }
        if samples < 2 {
            return Err(GridError::TooFewSamples { samples });
        }

        Ok(Self {
            start,
            end,
            samples,
        })
    }

    /// Returns the first grid time.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Returns the last grid time.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples
    }

    /// Always false, a valid grid has at least two samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the nominal spacing between samples.
    #[must_use]
    pub fn spacing(&self) -> f64 {
        (self.end - self.start) / (self.samples - 1) as f64
    }

    /// Returns the time of sample `index`.
    ///
    /// Indices past the end are clamped to the last sample.
    #[must_use]
    pub fn time(&self, index: usize) -> f64 {
        let last = self.samples - 1;
        if index >= last {
            return self.end;
        }

        #[allow(clippy::cast_precision_loss)]
        let fraction = index as f64 / last as f64;
        self.start + (self.end - self.start) * fraction
    }

    /// Returns an iterator over all sample times.
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.samples).map(|index| self.time(index))
    }
}
