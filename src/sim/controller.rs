//! Feedback-linearising surge/heading controller
//!
//! Cancels the known nonlinear terms of the decoupled ship model and closes
//! PD loops on surge speed and heading. Reference derivatives are estimated
//! with [`Derivative`] blocks, so the controller must be called exactly once
//! per tick.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::blocks::{Derivative, RateLimiter, Saturation};
use super::clock::Clock;
use super::hull::{Linearisation, at};
use super::state::{ControlReference, VesselState};
use crate::error::ConfigError;
use crate::wrap_angle;

/// Controller gains and actuator limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerGains {
    pub surge_p: f64,
    pub heading_p: f64,
    pub heading_d: f64,
    /// Thrust saturation (N)
    pub thrust_max: f64,
    /// Largest thrust change per step (N)
    pub thrust_rate: f64,
    /// Rudder saturation (rad)
    pub rudder_max: f64,
    /// Samples in each reference derivative estimate
    pub derivative_window: usize,
}

impl Default for ControllerGains {
    fn default() -> Self {
        Self {
            surge_p: 0.1,
            heading_p: 0.04,
            heading_d: 0.9,
            thrust_max: 1.0e8,
            thrust_rate: 5.0e5,
            rudder_max: PI,
            derivative_window: Derivative::DEFAULT_WINDOW,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedbackLinearizingController {
    params: Linearisation,
    gains: ControllerGains,
    surge_ref_rate: Derivative,
    heading_ref_rate: Derivative,
    heading_ref_accel: Derivative,
    thrust_saturation: Saturation,
    thrust_limiter: RateLimiter,
    rudder_saturation: Saturation,
    /// Continuous desired heading, so the derivative never sees a wrap jump
    heading_unwrapped: f64,
}

impl FeedbackLinearizingController {
    pub fn new(
        clock: &Clock,
        params: Linearisation,
        gains: ControllerGains,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            params,
            gains,
            surge_ref_rate: Derivative::with_window(clock, gains.derivative_window)?,
            heading_ref_rate: Derivative::with_window(clock, gains.derivative_window)?,
            heading_ref_accel: Derivative::with_window(clock, gains.derivative_window)?,
            thrust_saturation: Saturation::new(gains.thrust_max)?,
            thrust_limiter: RateLimiter::new(gains.thrust_rate)?,
            rudder_saturation: Saturation::new(gains.rudder_max)?,
            heading_unwrapped: 0.0,
        })
    }

    /// Set the internal blocks to steady tracking of `reference`
    pub fn prime(&mut self, reference: ControlReference) {
        let mp = &self.params.mass;
        let dp = &self.params.damping;

        self.heading_unwrapped = reference.desired_heading;
        self.surge_ref_rate.prime(reference.desired_surge);
        self.heading_ref_rate.prime(reference.desired_heading);
        self.heading_ref_accel.prime(0.0);

        let steady_tau = at(dp, 0, 0) / at(mp, 0, 0) * reference.desired_surge;
        self.thrust_limiter
            .prime(self.thrust_saturation.apply(steady_tau / self.params.k1));
    }

    /// Actuator force `[thrust, rudder]` for the current state and reference
    pub fn compute(&mut self, state: &VesselState, reference: ControlReference) -> DVec2 {
        let mp = &self.params.mass;
        let dp = &self.params.damping;
        let (u, v, r) = (state.surge, state.sway, state.yawrate);
        let u_des = reference.desired_surge;
        let psi_des = reference.desired_heading;

        self.heading_unwrapped += wrap_angle(psi_des - self.heading_unwrapped);

        let u_des_dot = self.surge_ref_rate.update(u_des);
        let psi_des_dot = self.heading_ref_rate.update(self.heading_unwrapped);
        let psi_des_ddot = self.heading_ref_accel.update(psi_des_dot);

        let f_u = (r / at(mp, 0, 0)) * (at(mp, 1, 2) * r + at(mp, 1, 1) * v);
        let f_r = (1.0 / (at(mp, 1, 1) * at(mp, 2, 2) - at(mp, 1, 2) * at(mp, 1, 2)))
            * (v * (at(dp, 1, 1) * at(mp, 1, 2) - at(dp, 2, 1) * at(mp, 1, 1)
                + u * (at(mp, 0, 0) * at(mp, 1, 1) - at(mp, 1, 1) * at(mp, 1, 1)))
                + r * (at(dp, 1, 2) * at(mp, 1, 2) - at(dp, 2, 2) * at(mp, 1, 1)
                    + u * (at(mp, 0, 0) * at(mp, 1, 2) - at(mp, 1, 1) * at(mp, 1, 2))));

        let tau_u = -f_u
            + u_des_dot
            + (at(dp, 0, 0) / at(mp, 0, 0)) * u_des
            + self.gains.surge_p * (u_des - u);
        let tau_r = -f_r + psi_des_ddot
            - self.gains.heading_p * wrap_angle(state.yaw - psi_des)
            - self.gains.heading_d * (r - psi_des_dot);

        let thrust = self
            .thrust_limiter
            .limit(self.thrust_saturation.apply(tau_u / self.params.k1));
        let rudder = self.rudder_saturation.apply(tau_r / self.params.k2);
        DVec2::new(thrust, rudder)
    }
}
