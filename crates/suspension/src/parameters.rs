use crate::error::{Parameter, SimulationError};

/// Validates raw physical parameters before a model is built.
///
/// Checks, in order, that `mass` is finite and positive, `damping` is finite
/// and non-negative, and `stiffness` is finite and positive.
///
/// # Errors
///
/// Returns [`SimulationError::InvalidParameter`] for the first field that
/// fails its check.
pub fn validate_parameters(mass: f64, damping: f64, stiffness: f64) -> Result<(), SimulationError> {
    require(Parameter::Mass, mass, mass > 0.0)?;
    require(Parameter::Damping, damping, damping >= 0.0)?;
    require(Parameter::Stiffness, stiffness, stiffness > 0.0)?;
    Ok(())
}

/// Fails with `InvalidParameter` unless `value` is finite and `in_range` holds.
pub(crate) fn require(field: Parameter, value: f64, in_range: bool) -> Result<(), SimulationError> {
    if value.is_finite() && in_range {
        Ok(())
    } else {
        Err(SimulationError::InvalidParameter { field, value })
    }
}
