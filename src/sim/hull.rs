//! Hull hydrodynamics for the 3-DOF models
//!
//! A hull supplies the mass matrix, damping, Coriolis and actuator mapping.
//! The integration scheme lives in [`super::model::Vessel`].

use glam::{DMat3, DVec2, DVec3};
use std::f64::consts::PI;

use super::state::Action;

/// Build a matrix from row-major entries
pub fn mat3_rows(rows: [[f64; 3]; 3]) -> DMat3 {
    DMat3::from_cols_array_2d(&rows).transpose()
}

/// Element at (row, col)
#[inline]
pub fn at(m: &DMat3, row: usize, col: usize) -> f64 {
    m.col(col)[row]
}

/// Centripetal/Coriolis matrix of a symmetric 3-DOF mass matrix
pub fn coriolis_matrix(mass: &DMat3, nu: DVec3) -> DMat3 {
    let a0 = at(mass, 0, 0) * nu.x;
    let a1 = at(mass, 1, 1) * nu.y + 0.5 * (at(mass, 1, 2) + at(mass, 2, 1)) * nu.z;
    mat3_rows([[0.0, 0.0, -a1], [0.0, 0.0, a0], [a1, -a0, 0.0]])
}

/// Decoupled model parameters used by the feedback-linearising controller
#[derive(Debug, Clone, Copy)]
pub struct Linearisation {
    pub mass: DMat3,
    pub damping: DMat3,
    pub k1: f64,
    pub k2: f64,
}

pub trait Hull {
    /// Registry name of the model
    const NAME: &'static str;

    fn mass(&self) -> DMat3;

    fn mass_inverse(&self) -> DMat3;

    /// `C(ν)ν`
    fn coriolis_force(&self, nu: DVec3) -> DVec3;

    /// `D(ν)ν`
    fn damping_force(&self, nu: DVec3) -> DVec3;

    /// `B(ν)f` for actuator force `f = [thrust, rudder]`
    fn actuation(&self, nu: DVec3, force: DVec2) -> DVec3;

    /// Actuator force when the action drives the actuators directly
    fn open_loop_force(&self, action: Action) -> DVec2;

    fn linearisation(&self) -> Option<Linearisation> {
        None
    }
}

/// Offshore supply ship, linear damping, decoupled sway/yaw coordinates
#[derive(Debug, Clone)]
pub struct SupplyShip {
    mass: DMat3,
    mass_inv: DMat3,
    damping: DMat3,
    thrust_col: DVec3,
    rudder_col: DVec3,
    k1: f64,
    k2: f64,
}

impl SupplyShip {
    pub const THRUST_MAX: f64 = 1.0e7;
    pub const RUDDER_MAX: f64 = PI;

    pub fn new() -> Self {
        let m = mat3_rows([
            [7.22e6, 0.0, 0.0],
            [0.0, 1.21e7, -3.63e7],
            [0.0, -3.63e7, 4.75e9],
        ]);
        let d = mat3_rows([
            [95070.0, 0.0, 0.0],
            [0.0, 4.34e6, -2.27e6],
            [0.0, -1.88e7, 7.57e8],
        ]);
        let b_thrust = DVec3::new(1.0, 0.0, 0.0);
        let b_rudder = DVec3::new(0.0, -1.13e6, 9.63e7);

        // Move the pivot point so the rudder produces no sway force
        let eps = -(at(&m, 2, 2) * b_rudder.y - at(&m, 1, 2) * b_rudder.z)
            / (at(&m, 1, 1) * b_rudder.z - at(&m, 1, 2) * b_rudder.y);
        let h = mat3_rows([[1.0, 0.0, 0.0], [0.0, 1.0, -eps], [0.0, 0.0, 1.0]]);
        let ht = h.transpose();

        let mass = ht * m * h;
        let damping = ht * d * h;

        let k1 = b_thrust.x / at(&m, 0, 0);
        let k2 = (at(&m, 1, 1) * b_rudder.z - at(&m, 1, 2) * b_rudder.y)
            / (at(&m, 1, 1) * at(&m, 2, 2) - at(&m, 1, 2) * at(&m, 1, 2));

        Self {
            mass,
            mass_inv: mass.inverse(),
            damping,
            thrust_col: ht * b_thrust,
            rudder_col: ht * b_rudder,
            k1,
            k2,
        }
    }
}

impl Default for SupplyShip {
    fn default() -> Self {
        Self::new()
    }
}

impl Hull for SupplyShip {
    const NAME: &'static str = "supply_ship_3dof";

    fn mass(&self) -> DMat3 {
        self.mass
    }

    fn mass_inverse(&self) -> DMat3 {
        self.mass_inv
    }

    fn coriolis_force(&self, nu: DVec3) -> DVec3 {
        coriolis_matrix(&self.mass, nu) * nu
    }

    fn damping_force(&self, nu: DVec3) -> DVec3 {
        self.damping * nu
    }

    fn actuation(&self, _nu: DVec3, force: DVec2) -> DVec3 {
        self.thrust_col * force.x + self.rudder_col * force.y
    }

    fn open_loop_force(&self, action: Action) -> DVec2 {
        DVec2::new(action.surge * Self::THRUST_MAX, action.steer * Self::RUDDER_MAX)
    }

    fn linearisation(&self) -> Option<Linearisation> {
        Some(Linearisation {
            mass: self.mass,
            damping: self.damping,
            k1: self.k1,
            k2: self.k2,
        })
    }
}

/// Small underwater vehicle in the horizontal plane, quadratic damping
#[derive(Debug, Clone)]
pub struct Auv {
    mass: DMat3,
    mass_inv: DMat3,
    quadratic_damping: DVec3,
}

impl Auv {
    pub const MASS: f64 = 18.82;
    pub const I_ZZ: f64 = 1.77;
    pub const X_UDOT: f64 = 0.421;
    pub const Y_VDOT: f64 = -27.2;
    pub const Y_RDOT: f64 = -1.83;
    pub const N_RDOT: f64 = -4.34;
    pub const X_UU: f64 = -3.11;
    pub const Y_VV: f64 = -3.01;
    pub const N_RR: f64 = -2.0;
    pub const N_UUDR: f64 = -6.08;

    pub const THRUST_MAX: f64 = 10.0;
    pub const RUDDER_MAX: f64 = 0.1;
    pub const MAX_SPEED: f64 = 1.8;

    pub fn new() -> Self {
        let rigid_body = DMat3::from_diagonal(DVec3::new(Self::MASS, Self::MASS, Self::I_ZZ));
        let added = mat3_rows([
            [Self::X_UDOT, 0.0, 0.0],
            [0.0, Self::Y_VDOT, Self::Y_RDOT],
            [0.0, Self::Y_RDOT, Self::N_RDOT],
        ]);
        let mass = rigid_body - added;
        Self {
            mass,
            mass_inv: mass.inverse(),
            quadratic_damping: -DVec3::new(Self::X_UU, Self::Y_VV, Self::N_RR),
        }
    }
}

impl Default for Auv {
    fn default() -> Self {
        Self::new()
    }
}

impl Hull for Auv {
    const NAME: &'static str = "auv_2d";

    fn mass(&self) -> DMat3 {
        self.mass
    }

    fn mass_inverse(&self) -> DMat3 {
        self.mass_inv
    }

    fn coriolis_force(&self, _nu: DVec3) -> DVec3 {
        DVec3::ZERO
    }

    fn damping_force(&self, nu: DVec3) -> DVec3 {
        self.quadratic_damping * nu.abs() * nu
    }

    fn actuation(&self, nu: DVec3, force: DVec2) -> DVec3 {
        // Rudder authority grows with the square of surge speed
        DVec3::new(force.x, 0.0, Self::N_UUDR * nu.x * nu.x * force.y)
    }

    fn open_loop_force(&self, action: Action) -> DVec2 {
        DVec2::new(action.surge * Self::THRUST_MAX, action.steer * Self::RUDDER_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mat3_rows_layout() {
        let m = mat3_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        assert_eq!(at(&m, 0, 2), 3.0);
        assert_eq!(at(&m, 2, 0), 7.0);
        assert_eq!(m * DVec3::X, DVec3::new(1.0, 4.0, 7.0));
    }

    #[test]
    fn test_supply_ship_decoupled_rudder() {
        let ship = SupplyShip::new();
        let m_inv = ship.mass_inverse();
        // In the decoupled frame the rudder drives yaw acceleration, not sway
        let accel = m_inv * ship.actuation(DVec3::ZERO, DVec2::new(0.0, 1.0));
        assert!(accel.y.abs() < 1e-9 * accel.z.abs());
        assert!(accel.z != 0.0);
    }

    #[test]
    fn test_supply_ship_mass_symmetric() {
        let m = SupplyShip::new().mass();
        assert_relative_eq!(at(&m, 1, 2), at(&m, 2, 1), max_relative = 1e-12);
        assert_relative_eq!(at(&m, 0, 0), 7.22e6);
    }

    #[test]
    fn test_coriolis_does_no_work() {
        let ship = SupplyShip::new();
        let nu = DVec3::new(3.0, -0.4, 0.02);
        let power = ship.coriolis_force(nu).dot(nu);
        assert!(power.abs() < 1e-6 * ship.coriolis_force(nu).length().max(1.0));
    }

    #[test]
    fn test_forces_vanish_at_rest() {
        let ship = SupplyShip::new();
        let auv = Auv::new();
        assert_eq!(ship.coriolis_force(DVec3::ZERO), DVec3::ZERO);
        assert_eq!(ship.damping_force(DVec3::ZERO), DVec3::ZERO);
        assert_eq!(auv.damping_force(DVec3::ZERO), DVec3::ZERO);
        assert_eq!(auv.actuation(DVec3::ZERO, DVec2::new(0.0, 1.0)), DVec3::ZERO);
    }

    #[test]
    fn test_auv_quadratic_damping_opposes_motion() {
        let auv = Auv::new();
        let d = auv.damping_force(DVec3::new(-2.0, 0.0, 0.0));
        assert_relative_eq!(d.x, 3.11 * 2.0 * -2.0);
        assert!(auv.linearisation().is_none());
    }
}
