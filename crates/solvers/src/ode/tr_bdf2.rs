//! TR-BDF2: a trapezoidal stage over `γ·h` followed by a BDF2 stage.
//!
//! With `γ = 2 − √2` both stages are implicit in the same matrix
//! `I − d·h·J` (`d = γ/2`), so one LU factorization per step serves both
//! Newton solves and the error filter. The method is L-stable, which keeps
//! heavily overdamped systems cheap: the step size follows the slow mode.

use nalgebra::{DMatrix, DVector, Dyn, linalg::LU};
use sprung_core::{Observer, OdeProblem, State};

use super::{Action, Error, Event, driver::Driver};

/// Fraction of the step covered by the trapezoidal stage.
const GAMMA: f64 = 2.0 - std::f64::consts::SQRT_2;

/// Implicit weight shared by both stages.
const D: f64 = GAMMA / 2.0;

/// Local error constant of the composite step.
const ERROR_CONSTANT: f64 = (-3.0 * GAMMA * GAMMA + 4.0 * GAMMA - 2.0) / (12.0 * (2.0 - GAMMA));

const MAX_NEWTON_ITERATIONS: usize = 10;

/// Newton stops once the scaled update is this fraction of the tolerance.
const NEWTON_TOLERANCE: f64 = 1e-2;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

/// Step size cut applied when Newton fails to converge.
const NEWTON_FAILURE_FACTOR: f64 = 0.25;

/// A step within this factor of the remaining interval is stretched to land.
const STRETCH: f64 = 1.01;

/// Adaptive TR-BDF2 stepper.
#[derive(Debug)]
pub(super) struct TrBdf2<const N: usize> {
    abs_tol: f64,
    rel_tol: f64,
    h: Option<f64>,
}

/// The outcome of one trial step.
enum Trial<const N: usize> {
    Done {
        y: [f64; N],
        f: [f64; N],
        error: f64,
    },
    NoConvergence,
    NonFinite,
}

impl<const N: usize> TrBdf2<N> {
    pub(super) fn new(abs_tol: f64, rel_tol: f64) -> Self {
        Self {
            abs_tol,
            rel_tol,
            h: None,
        }
    }

    /// Advances from `from` to exactly `target`, the grid time of sample `index`.
    pub(super) fn advance<P, Obs>(
        &mut self,
        driver: &mut Driver<'_, P, Obs, N>,
        from: State<N>,
        target: f64,
        index: usize,
    ) -> Result<State<N>, Error<P::Error>>
    where
        P: OdeProblem<N>,
        Obs: Observer<Event<N>, Action>,
    {
        let State { mut t, mut y } = from;
        let mut f = driver.eval(t, &y)?;
        let mut h_next = self.h.unwrap_or(target - t);
        let mut diverged = false;

        while t < target {
            let remaining = target - t;
            let lands = h_next * STRETCH >= remaining;
            let h = if lands { remaining } else { h_next };

            if h <= min_step(t) || t + h == t {
                return Err(if diverged {
                    Error::NonFiniteState { t, index }
                } else {
                    Error::StepSizeTooSmall { t, h }
                });
            }

            driver.attempt(t)?;
            let t_new = if lands { target } else { t + h };

            match self.trial(driver, t, &y, &f, h, t_new)? {
                Trial::Done {
                    y: y_new,
                    f: f_new,
                    error,
                } if error <= 1.0 => {
                    t = t_new;
                    y = y_new;
                    f = f_new;
                    diverged = false;
                    driver.accept(State::new(t, y), h)?;

                    // Landing steps keep the controller's proposal for the next interval.
                    let proposed = h * step_factor(error);
                    h_next = if lands { proposed.max(h_next) } else { proposed };
                }
                Trial::Done { error, .. } => {
                    driver.reject();
                    h_next = h * step_factor(error).min(1.0);
                }
                Trial::NoConvergence => {
                    driver.reject();
                    h_next = h * NEWTON_FAILURE_FACTOR;
                }
                Trial::NonFinite => {
                    driver.reject();
                    diverged = true;
                    h_next = h * NEWTON_FAILURE_FACTOR;
                }
            }
        }

        self.h = Some(h_next);
        Ok(State::new(target, y))
    }

    /// Attempts one step of size `h` from `(t, y)` where `f = f(t, y)`.
    fn trial<P, Obs>(
        &self,
        driver: &mut Driver<'_, P, Obs, N>,
        t: f64,
        y: &[f64; N],
        f: &[f64; N],
        h: f64,
        t_new: f64,
    ) -> Result<Trial<N>, Error<P::Error>>
    where
        P: OdeProblem<N>,
        Obs: Observer<Event<N>, Action>,
    {
        let jacobian = jacobian(driver, t, y, f)?;
        let dh = D * h;
        let Some(lu) = factor(&jacobian, dh) else {
            return Ok(Trial::NoConvergence);
        };

        // Trapezoidal stage to t + γh.
        let t_gamma = t + GAMMA * h;
        let a_gamma: [f64; N] = std::array::from_fn(|i| y[i] + dh * f[i]);
        let guess: [f64; N] = std::array::from_fn(|i| y[i] + GAMMA * h * f[i]);
        let (y_gamma, f_gamma) = match self.newton(driver, &lu, t_gamma, &a_gamma, guess, dh)? {
            Some(stage) => stage,
            None => return Ok(self.failure(&guess)),
        };

        // BDF2 stage through t, t + γh, and t + h.
        let weight = GAMMA * (2.0 - GAMMA);
        let a_new: [f64; N] =
            std::array::from_fn(|i| (y_gamma[i] - (1.0 - GAMMA).powi(2) * y[i]) / weight);
        let guess: [f64; N] = std::array::from_fn(|i| a_new[i] + dh * f_gamma[i]);
        let (y_new, f_new) = match self.newton(driver, &lu, t_new, &a_new, guess, dh)? {
            Some(stage) => stage,
            None => return Ok(self.failure(&guess)),
        };

        // Filtering through the iteration matrix damps the estimate on stiff modes.
        let raw = DVector::from_fn(N, |i, _| {
            ERROR_CONSTANT.abs()
                * 2.0
                * h
                * ((f_new[i] - f_gamma[i]) / (1.0 - GAMMA) - (f_gamma[i] - f[i]) / GAMMA)
        });
        let Some(estimate) = lu.solve(&raw) else {
            return Ok(Trial::NoConvergence);
        };

        let error = self.norm(|i| estimate[i], |i| y[i].abs().max(y_new[i].abs()));
        if !error.is_finite() {
            return Ok(Trial::NonFinite);
        }

        Ok(Trial::Done {
            y: y_new,
            f: f_new,
            error,
        })
    }

    /// Solves `z = a + dh·f(t, z)` by simplified Newton iteration.
    ///
    /// Returns the converged stage and its derivative, recovered from the
    /// stage equation rather than a further evaluation.
    fn newton<P, Obs>(
        &self,
        driver: &mut Driver<'_, P, Obs, N>,
        lu: &LU<f64, Dyn, Dyn>,
        t: f64,
        a: &[f64; N],
        mut z: [f64; N],
        dh: f64,
    ) -> Result<Option<([f64; N], [f64; N])>, Error<P::Error>>
    where
        P: OdeProblem<N>,
        Obs: Observer<Event<N>, Action>,
    {
        for _ in 0..MAX_NEWTON_ITERATIONS {
            let f = driver.eval(t, &z)?;
            let residual = DVector::from_fn(N, |i, _| z[i] - a[i] - dh * f[i]);
            let Some(delta) = lu.solve(&residual) else {
                return Ok(None);
            };

            for (value, change) in z.iter_mut().zip(delta.iter()) {
                *value -= change;
            }
            if z.iter().any(|v| !v.is_finite()) {
                return Ok(None);
            }

            if self.norm(|i| delta[i], |i| z[i].abs()) <= NEWTON_TOLERANCE {
                let f = std::array::from_fn(|i| (z[i] - a[i]) / dh);
                return Ok(Some((z, f)));
            }
        }
        Ok(None)
    }

    fn failure(&self, guess: &[f64; N]) -> Trial<N> {
        if guess.iter().all(|v| v.is_finite()) {
            Trial::NoConvergence
        } else {
            Trial::NonFinite
        }
    }

    /// Scaled RMS norm of `value` against `abs_tol + rel_tol·magnitude`.
    fn norm(&self, value: impl Fn(usize) -> f64, magnitude: impl Fn(usize) -> f64) -> f64 {
        let sum: f64 = (0..N)
            .map(|i| {
                let scale = self.abs_tol + self.rel_tol * magnitude(i);
                (value(i) / scale).powi(2)
            })
            .sum();
        (sum / N as f64).sqrt()
    }
}

/// Forward-difference Jacobian of `f` at `(t, y)`.
fn jacobian<P, Obs, const N: usize>(
    driver: &mut Driver<'_, P, Obs, N>,
    t: f64,
    y: &[f64; N],
    f: &[f64; N],
) -> Result<DMatrix<f64>, Error<P::Error>>
where
    P: OdeProblem<N>,
    Obs: Observer<Event<N>, Action>,
{
    let mut jacobian = DMatrix::zeros(N, N);
    for j in 0..N {
        let delta = f64::EPSILON.sqrt() * y[j].abs().max(1.0);
        let mut shifted = *y;
        shifted[j] += delta;
        let f_shifted = driver.eval(t, &shifted)?;
        for i in 0..N {
            jacobian[(i, j)] = (f_shifted[i] - f[i]) / delta;
        }
    }
    Ok(jacobian)
}

/// Factors the iteration matrix `I − dh·J`.
fn factor(jacobian: &DMatrix<f64>, dh: f64) -> Option<LU<f64, Dyn, Dyn>> {
    let matrix = DMatrix::identity(jacobian.nrows(), jacobian.ncols()) - jacobian * dh;
    if matrix.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let lu = matrix.lu();
    lu.is_invertible().then_some(lu)
}

/// Smallest usable step at `t`, relative to `t` itself.
fn min_step(t: f64) -> f64 {
    (16.0 * f64::EPSILON * t.abs()).max(f64::MIN_POSITIVE)
}

fn step_factor(error: f64) -> f64 {
    if error == 0.0 {
        return MAX_FACTOR;
    }
    (SAFETY * error.powf(-1.0 / 3.0)).clamp(MIN_FACTOR, MAX_FACTOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_share_one_implicit_weight() {
        let bdf2_weight = (1.0 - GAMMA) / (2.0 - GAMMA);
        assert!((D - bdf2_weight).abs() < 1e-15);
    }

    #[test]
    fn min_step_scales_with_time() {
        assert_eq!(min_step(0.0), f64::MIN_POSITIVE);
        assert!(min_step(1e-12) < 1e-26);
        assert!((min_step(1.0) - 16.0 * f64::EPSILON).abs() < f64::EPSILON);
    }

    #[test]
    fn step_factor_is_clamped() {
        assert_eq!(step_factor(0.0), MAX_FACTOR);
        assert_eq!(step_factor(1e12), MIN_FACTOR);
        assert!(step_factor(1.0) < 1.0);
    }
}
