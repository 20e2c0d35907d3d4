use thiserror::Error;

/// Default absolute and relative tolerance for adaptive stepping.
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

/// Default limit on attempted steps (accepted plus rejected).
pub const DEFAULT_MAX_STEPS: usize = 1_000_000;

/// Supported numerical integration methods.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Method {
    /// Classic fixed-step 4th-order Runge–Kutta method.
    ///
    /// Takes `substeps` equal steps between consecutive grid samples. Does not
    /// estimate local error, so accuracy is entirely up to the caller.
    Rk4 { substeps: usize },

    /// Adaptive Dormand–Prince 5(4) Runge–Kutta method.
    ///
    /// An explicit embedded method that computes both 5th and 4th order
    /// solutions to estimate local truncation error. The solver adjusts the
    /// step size to keep the error within specified `abs_tol` and `rel_tol`
    /// bounds. Efficient for non-stiff problems such as lightly damped
    /// oscillation.
    Dopri5 { abs_tol: f64, rel_tol: f64 },

    /// Adaptive Dormand–Prince 8(5,3) Runge–Kutta method.
    ///
    /// A higher-order embedded method with 8th, 5th, and 3rd order solutions
    /// for precise error control. More expensive per step than `Dopri5`, but
    /// often cheaper overall at very tight tolerances.
    Dop853 { abs_tol: f64, rel_tol: f64 },

    /// Adaptive TR-BDF2, an L-stable implicit one-step method.
    ///
    /// A trapezoidal stage over `γ·h` followed by a BDF2 stage, with a
    /// Newton solve against a finite-difference Jacobian at every step. Its
    /// step size is limited by accuracy only, which makes it the method of
    /// choice for stiff problems such as heavily overdamped systems.
    TrBdf2 { abs_tol: f64, rel_tol: f64 },
}

/// Errors that can occur when building a solver [`Config`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("abs_tol must be finite and positive")]
    AbsTol,

    #[error("rel_tol must be finite and non-negative")]
    RelTol,

    #[error("substeps must be at least 1")]
    Substeps,

    #[error("max_steps must be at least 1")]
    MaxSteps,
}

/// Configuration for the ODE solver.
///
/// With `stiff_fallback` enabled (the default), a [`Method::Dopri5`] or
/// [`Method::Dop853`] solve that detects stiffness or exhausts its internal
/// step limit restarts the current grid interval with [`Method::TrBdf2`] at
/// the same tolerances and keeps using it for the rest of the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    method: Method,
    max_steps: usize,
    stiff_fallback: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            method: Method::Dopri5 {
                abs_tol: DEFAULT_TOLERANCE,
                rel_tol: DEFAULT_TOLERANCE,
            },
            max_steps: DEFAULT_MAX_STEPS,
            stiff_fallback: true,
        }
    }
}

impl Config {
    /// Creates an adaptive Dormand–Prince 5(4) config.
    ///
    /// # Errors
    ///
    /// Returns an error if `abs_tol` is not finite and positive or `rel_tol`
    /// is not finite and non-negative.
    pub fn dopri5(abs_tol: f64, rel_tol: f64) -> Result<Self, ConfigError> {
        check_tolerances(abs_tol, rel_tol)?;
        Ok(Self::with_method(Method::Dopri5 { abs_tol, rel_tol }))
    }

    /// Creates an adaptive Dormand–Prince 8(5,3) config.
    ///
    /// # Errors
    ///
    /// Same as [`Config::dopri5`].
    pub fn dop853(abs_tol: f64, rel_tol: f64) -> Result<Self, ConfigError> {
        check_tolerances(abs_tol, rel_tol)?;
        Ok(Self::with_method(Method::Dop853 { abs_tol, rel_tol }))
    }

    /// Creates an adaptive TR-BDF2 config.
    ///
    /// # Errors
    ///
    /// Same as [`Config::dopri5`].
    pub fn tr_bdf2(abs_tol: f64, rel_tol: f64) -> Result<Self, ConfigError> {
        check_tolerances(abs_tol, rel_tol)?;
        Ok(Self::with_method(Method::TrBdf2 { abs_tol, rel_tol }))
    }

    /// Creates a fixed-step RK4 config with `substeps` steps per grid interval.
    ///
    /// # Errors
    ///
    /// Returns an error if `substeps` is zero.
    pub fn rk4(substeps: usize) -> Result<Self, ConfigError> {
        if substeps == 0 {
            return Err(ConfigError::Substeps);
        }
        Ok(Self::with_method(Method::Rk4 { substeps }))
    }

    /// Sets the limit on attempted steps.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_steps` is zero.
    pub fn with_max_steps(mut self, max_steps: usize) -> Result<Self, ConfigError> {
        if max_steps == 0 {
            return Err(ConfigError::MaxSteps);
        }
        self.max_steps = max_steps;
        Ok(self)
    }

    /// Disables the switch to TR-BDF2 when an explicit method gives up.
    #[must_use]
    pub fn without_stiff_fallback(mut self) -> Self {
        self.stiff_fallback = false;
        self
    }

    /// Returns the integration method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the limit on attempted steps.
    #[must_use]
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Returns true if explicit adaptive methods fall back to TR-BDF2.
    #[must_use]
    pub fn stiff_fallback(&self) -> bool {
        self.stiff_fallback
    }

    fn with_method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }
}

fn check_tolerances(abs_tol: f64, rel_tol: f64) -> Result<(), ConfigError> {
    if !abs_tol.is_finite() || abs_tol <= 0.0 {
        return Err(ConfigError::AbsTol);
    }
    if !rel_tol.is_finite() || rel_tol < 0.0 {
        return Err(ConfigError::RelTol);
    }
    Ok(())
}
