//! 3-DOF vessel dynamics
//!
//! Per step:
//! 1. Update the control reference from the action (rate-limited surge,
//!    integrated heading)
//! 2. Compute actuator force, either from the feedback-linearising
//!    controller or directly from the action
//! 3. `ν̇ = M⁻¹(Bf − C(ν)ν − D(ν)ν)`, integrate velocity
//! 4. `η̇ = R(ψ)ν`, using the updated velocity, integrate pose

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::blocks::{Integrator, RateLimiter};
use super::clock::Clock;
use super::controller::{ControllerGains, FeedbackLinearizingController};
use super::hull::Hull;
use super::state::{Action, ControlReference, VesselState};
use crate::error::ConfigError;
use crate::wrap_angle;

/// A steppable vessel model
pub trait DynamicsModel {
    fn name(&self) -> &'static str;

    /// Restart from `initial`, clearing all block memory
    fn reset(&mut self, initial: VesselState);

    /// Advance one clock step
    fn step(&mut self, action: Action) -> VesselState;

    fn state(&self) -> VesselState;

    fn reference(&self) -> ControlReference;
}

/// How an action is turned into a control reference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VesselConfig {
    /// Use the feedback-linearising controller instead of open-loop actuation
    pub use_controller: bool,
    /// Desired surge at full surge command (m/s)
    pub cruise_speed: f64,
    /// Desired heading change at full steer command (rad/s)
    pub heading_rate: f64,
    /// Largest change of desired surge per step (m/s)
    pub surge_reference_rate: f64,
    pub gains: ControllerGains,
}

impl Default for VesselConfig {
    fn default() -> Self {
        Self {
            use_controller: true,
            cruise_speed: 4.0,
            heading_rate: 0.2,
            surge_reference_rate: 0.2,
            gains: ControllerGains::default(),
        }
    }
}

/// Semi-implicit Euler integration of a [`Hull`]
#[derive(Debug, Clone)]
pub struct Vessel<H: Hull> {
    hull: H,
    config: VesselConfig,
    controller: Option<FeedbackLinearizingController>,
    surge_reference: RateLimiter,
    heading_reference: Integrator<f64>,
    velocity: Integrator<DVec3>,
    pose: Integrator<DVec3>,
    reference: ControlReference,
    state: VesselState,
}

impl<H: Hull> Vessel<H> {
    pub fn new(clock: &Clock, hull: H, config: VesselConfig) -> Result<Self, ConfigError> {
        if !(config.cruise_speed >= 0.0 && config.cruise_speed.is_finite()) {
            return Err(ConfigError::InvalidSetting {
                name: "cruise_speed",
                reason: format!("must be non-negative, got {}", config.cruise_speed),
            });
        }

        let controller = if config.use_controller {
            let params = hull
                .linearisation()
                .ok_or(ConfigError::ControllerUnsupported(H::NAME))?;
            Some(FeedbackLinearizingController::new(clock, params, config.gains)?)
        } else {
            None
        };

        Ok(Self {
            hull,
            config,
            controller,
            surge_reference: RateLimiter::new(config.surge_reference_rate)?,
            heading_reference: Integrator::new(clock, 0.0),
            velocity: Integrator::new(clock, DVec3::ZERO),
            pose: Integrator::new(clock, DVec3::ZERO),
            reference: ControlReference::default(),
            state: VesselState::default(),
        })
    }

    pub fn hull(&self) -> &H {
        &self.hull
    }

    pub fn config(&self) -> &VesselConfig {
        &self.config
    }

    fn update_reference(&mut self, action: Action) {
        let surge = self
            .surge_reference
            .limit(action.surge * self.config.cruise_speed)
            .max(0.0);
        let heading = self
            .heading_reference
            .integrate(action.steer * self.config.heading_rate);
        let heading = wrap_angle(heading);
        self.heading_reference.reset(heading);

        self.reference = ControlReference {
            desired_surge: surge,
            desired_heading: heading,
        };
    }

    /// `[ẋ, ẏ, ψ̇]` from body velocity
    fn pose_rate(yaw: f64, nu: DVec3) -> DVec3 {
        let (s, c) = wrap_angle(yaw).sin_cos();
        DVec3::new(c * nu.x - s * nu.y, s * nu.x + c * nu.y, nu.z)
    }
}

impl<H: Hull> DynamicsModel for Vessel<H> {
    fn name(&self) -> &'static str {
        H::NAME
    }

    fn reset(&mut self, initial: VesselState) {
        let initial = VesselState::from_vectors(initial.eta(), initial.nu());
        self.state = initial;
        self.velocity.reset(initial.nu());
        self.pose.reset(initial.eta());

        self.reference = ControlReference {
            desired_surge: initial.surge.max(0.0),
            desired_heading: initial.yaw,
        };
        self.surge_reference.prime(self.reference.desired_surge);
        self.heading_reference.reset(initial.yaw);
        if let Some(controller) = self.controller.as_mut() {
            controller.prime(self.reference);
        }
    }

    fn step(&mut self, action: Action) -> VesselState {
        let action = action.clamped();
        self.update_reference(action);

        let force = match self.controller.as_mut() {
            Some(controller) => controller.compute(&self.state, self.reference),
            None => self.hull.open_loop_force(action),
        };

        let nu = self.state.nu();
        let nu_dot = self.hull.mass_inverse()
            * (self.hull.actuation(nu, force)
                - self.hull.coriolis_force(nu)
                - self.hull.damping_force(nu));
        let nu = self.velocity.integrate(nu_dot);

        let eta = self.pose.integrate(Self::pose_rate(self.state.yaw, nu));
        let eta = DVec3::new(eta.x, eta.y, wrap_angle(eta.z));
        self.pose.reset(eta);

        self.state = VesselState::from_vectors(eta, nu);
        self.state
    }

    fn state(&self) -> VesselState {
        self.state
    }

    fn reference(&self) -> ControlReference {
        self.reference
    }
}
