use std::{f64::consts::PI, fmt};

use serde::Serialize;
use uom::si::{f64::Mass, mass::kilogram};

use crate::{
    Force, SimulationResult,
    error::{Derived, SimulationError},
    parameters::validate_parameters,
    simulate,
    units::{DampingCoefficient, Stiffness},
};

/// Tolerance on `|ζ − 1|` within which a model is critically damped.
pub const CRITICAL_DAMPING_TOLERANCE: f64 = 1e-6;

/// Half-width of the band around `ω_force / ω_n = 1` treated as near resonance.
pub const RESONANCE_BAND: f64 = 0.2;

/// The free-response character of a suspension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DampingRegime {
    /// `ζ < 1`: oscillatory decay.
    Underdamped,
    /// `|ζ − 1| < 1e-6`: the fastest non-oscillatory decay.
    CriticallyDamped,
    /// Otherwise: non-oscillatory decay.
    Overdamped,
}

impl DampingRegime {
    /// Classifies a damping ratio.
    ///
    /// The checks run in order, so a ratio just below 1 is underdamped even
    /// when it is within the critical tolerance.
    #[must_use]
    pub fn classify(damping_ratio: f64) -> Self {
        if damping_ratio < 1.0 {
            Self::Underdamped
        } else if (damping_ratio - 1.0).abs() < CRITICAL_DAMPING_TOLERANCE {
            Self::CriticallyDamped
        } else {
            Self::Overdamped
        }
    }
}

impl fmt::Display for DampingRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Underdamped => "Underdamped",
            Self::CriticallyDamped => "Critically Damped",
            Self::Overdamped => "Overdamped",
        })
    }
}

/// An immutable spring-mass-damper suspension.
///
/// All values are SI: mass in kg, damping in N·s/m, stiffness in N/m,
/// frequencies in rad/s. The model can only be created through
/// [`SuspensionModel::new`] or [`SuspensionModel::from_quantities`], so every
/// instance has valid parameters and finite derived quantities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SuspensionModel {
    mass: f64,
    damping: f64,
    stiffness: f64,
    natural_frequency: f64,
    critical_damping: f64,
    damping_ratio: f64,
    regime: DampingRegime,
}

impl SuspensionModel {
    /// Creates a model from SI values.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidParameter`] if a parameter is out of
    /// range, or [`SimulationError::Computation`] if a derived quantity is not
    /// finite (for example with extreme magnitudes).
    pub fn new(mass: f64, damping: f64, stiffness: f64) -> Result<Self, SimulationError> {
        validate_parameters(mass, damping, stiffness)?;

        let natural_frequency = finite(Derived::NaturalFrequency, (stiffness / mass).sqrt())?;
        let critical_damping = finite(Derived::CriticalDamping, 2.0 * (stiffness * mass).sqrt())?;
        let damping_ratio = finite(Derived::DampingRatio, damping / critical_damping)?;
        let regime = DampingRegime::classify(damping_ratio);

        tracing::debug!(
            mass,
            damping,
            stiffness,
            natural_frequency,
            damping_ratio,
            %regime,
            "built suspension model"
        );

        Ok(Self {
            mass,
            damping,
            stiffness,
            natural_frequency,
            critical_damping,
            damping_ratio,
            regime,
        })
    }

    /// Creates a model from dimensioned quantities.
    ///
    /// # Errors
    ///
    /// Same as [`SuspensionModel::new`].
    pub fn from_quantities(
        mass: Mass,
        damping: DampingCoefficient,
        stiffness: Stiffness,
    ) -> Result<Self, SimulationError> {
        Self::new(mass.get::<kilogram>(), damping.value, stiffness.value)
    }

    /// Mass `m` in kg.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Damping coefficient `c` in N·s/m.
    #[must_use]
    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Spring stiffness `k` in N/m.
    #[must_use]
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Natural frequency `ω_n = sqrt(k/m)` in rad/s.
    #[must_use]
    pub fn natural_frequency(&self) -> f64 {
        self.natural_frequency
    }

    /// Natural frequency in Hz.
    #[must_use]
    pub fn natural_frequency_hz(&self) -> f64 {
        self.natural_frequency / (2.0 * PI)
    }

    /// Critical damping `c_crit = 2·sqrt(k·m)` in N·s/m.
    #[must_use]
    pub fn critical_damping(&self) -> f64 {
        self.critical_damping
    }

    /// Damping ratio `ζ = c / c_crit`.
    #[must_use]
    pub fn damping_ratio(&self) -> f64 {
        self.damping_ratio
    }

    /// The damping regime.
    #[must_use]
    pub fn regime(&self) -> DampingRegime {
        self.regime
    }

    /// Damped oscillation frequency `ω_n·sqrt(1 − ζ²)` in rad/s.
    ///
    /// Returns `None` unless the model is underdamped.
    #[must_use]
    pub fn damped_frequency(&self) -> Option<f64> {
        (self.regime == DampingRegime::Underdamped)
            .then(|| self.natural_frequency * (1.0 - self.damping_ratio.powi(2)).sqrt())
    }

    /// Ratio of a forcing frequency (rad/s) to the natural frequency.
    #[must_use]
    pub fn frequency_ratio(&self, forcing_frequency: f64) -> f64 {
        forcing_frequency / self.natural_frequency
    }

    /// Returns true if a forcing frequency (rad/s) lies within
    /// [`RESONANCE_BAND`] of the natural frequency.
    #[must_use]
    pub fn is_near_resonance(&self, forcing_frequency: f64) -> bool {
        (self.frequency_ratio(forcing_frequency) - 1.0).abs() < RESONANCE_BAND
    }

    /// Total mechanical energy `½·m·v² + ½·k·x²` in J.
    #[must_use]
    pub fn mechanical_energy(&self, displacement: f64, velocity: f64) -> f64 {
        0.5 * self.mass * velocity.powi(2) + 0.5 * self.stiffness * displacement.powi(2)
    }

    /// Simulates the unforced response.
    ///
    /// See [`solve_homogeneous`](crate::solve_homogeneous).
    ///
    /// # Errors
    ///
    /// Returns an error if the request is invalid or the solve fails.
    pub fn solve_homogeneous(
        &self,
        initial_displacement: f64,
        initial_velocity: f64,
        time_horizon: f64,
        sample_count: usize,
    ) -> Result<SimulationResult, SimulationError> {
        simulate::solve_homogeneous(
            self,
            initial_displacement,
            initial_velocity,
            time_horizon,
            sample_count,
        )
    }

    /// Simulates the response to an external force.
    ///
    /// See [`solve_forced`](crate::solve_forced).
    ///
    /// # Errors
    ///
    /// Returns an error if the request is invalid, the force fails, or the
    /// solve fails.
    pub fn solve_forced<F: Force + ?Sized>(
        &self,
        initial_displacement: f64,
        initial_velocity: f64,
        force: &F,
        time_horizon: f64,
        sample_count: usize,
    ) -> Result<SimulationResult, SimulationError> {
        simulate::solve_forced(
            self,
            initial_displacement,
            initial_velocity,
            force,
            time_horizon,
            sample_count,
        )
    }
}

impl fmt::Display for SuspensionModel {
    /// Writes a parameter summary, one quantity per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mass (m):                   {:.2} kg", self.mass)?;
        writeln!(f, "Damping coefficient (c):    {:.2} N·s/m", self.damping)?;
        writeln!(f, "Spring stiffness (k):       {:.2} N/m", self.stiffness)?;
        writeln!(f, "Natural frequency (ω_n):    {:.4} rad/s", self.natural_frequency)?;
        writeln!(f, "Critical damping (c_crit):  {:.2} N·s/m", self.critical_damping)?;
        writeln!(f, "Damping ratio (ζ):          {:.4}", self.damping_ratio)?;
        write!(f, "Damping regime:             {}", self.regime)
    }
}

fn finite(quantity: Derived, value: f64) -> Result<f64, SimulationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimulationError::Computation { quantity, value })
    }
}
