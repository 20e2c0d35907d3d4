use uom::{
    si::{ISQ, Quantity, SI},
    typenum::{N1, N2, P1, Z0},
};

/// Stiffness is a force per unit length (N/m or kg/s²).
pub type Stiffness = Quantity<ISQ<Z0, P1, N2, Z0, Z0, Z0, Z0>, SI<f64>, f64>;

/// Viscous damping coefficient is a force per unit velocity (N·s/m or kg/s).
pub type DampingCoefficient = Quantity<ISQ<Z0, P1, N1, Z0, Z0, Z0, Z0>, SI<f64>, f64>;
