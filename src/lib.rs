//! Vessel Sim - fixed-step path-following simulation for a surface vessel
//!
//! Core modules:
//! - `sim`: Clock, signal blocks, vessel dynamics and obstacles
//! - `path`: Arc-length parametrised reference paths
//! - `objective`: Observation, reward and termination for path following
//! - `scenario`, `registry`: Episode generators and name lookup
//! - `env`: Composition of the above into a resettable episode
//! - `renderer`: Backend-agnostic drawing interface

pub mod env;
pub mod error;
pub mod navigator;
pub mod objective;
pub mod path;
pub mod registry;
pub mod renderer;
pub mod scenario;
pub mod settings;
pub mod sim;

pub use env::{Environment, StepResult};
pub use error::{ConfigError, EnvError, GeometryError, ScenarioError};
pub use settings::Settings;

use glam::DVec2;
use std::f64::consts::{PI, TAU};

/// Simulation configuration constants
pub mod consts {
    /// Default fixed step (seconds)
    pub const DEFAULT_STEP_SIZE: f64 = 0.05;

    /// Surge error normaliser and relative speed normaliser (m/s)
    pub const MAX_SURGE: f64 = 10.0;
    /// Look-ahead distance along the path for heading error (m)
    pub const LOOKAHEAD_DISTANCE: f64 = 75.0;
    /// Obstacle sensor range (m)
    pub const OBSTACLE_RANGE: f64 = 150.0;
    /// Tracked obstacles are evicted beyond RANGE * this factor
    pub const RANGE_HYSTERESIS: f64 = 1.05;

    /// Reward on collision (negated)
    pub const COLLISION_PENALTY: f64 = 25.0;
    /// Episode fails once the cumulative reward drops below this
    pub const FAILURE_THRESHOLD: f64 = -50.0;
    /// Reward on leaving the playfield (negated)
    pub const PLAYFIELD_PENALTY: f64 = 50.0;
    /// Remaining arc length counted as arrival (m)
    pub const SUCCESS_MARGIN: f64 = 1.0;
    /// Progress reward is delta-s divided by this
    pub const PROGRESS_DIVISOR: f64 = 4.0;
    pub const CROSS_TRACK_WEIGHT: f64 = 0.5;
    pub const SURGE_WEIGHT: f64 = 0.5;

    /// Hull radius used for collision and closeness (m)
    pub const VESSEL_RADIUS: f64 = 4.0;

    /// Obstacle slot capacities
    pub const STATIC_SLOTS: usize = 4;
    pub const DYNAMIC_SLOTS: usize = 2;

    /// Base observation: surge error, heading error, cross-track, target distance
    pub const BASE_OBSERVATION_LEN: usize = 4;
    pub const STATIC_SLOT_LEN: usize = 2;
    pub const DYNAMIC_SLOT_LEN: usize = 4;

    /// Points used when sampling a path for drawing
    pub const PATH_SAMPLES: usize = 500;
}

/// Wrap an angle to (-π, π]
#[inline]
pub fn wrap_angle(angle: f64) -> f64 {
    if angle > -PI && angle <= PI {
        return angle;
    }
    let wrapped = PI - (PI - angle).rem_euclid(TAU);
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Rotate a vector counter-clockwise by `angle`
#[inline]
pub fn rotate(v: DVec2, angle: f64) -> DVec2 {
    DVec2::from_angle(angle).rotate(v)
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> DVec2 {
    DVec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: DVec2) -> (f64, f64) {
    (pos.length(), pos.y.atan2(pos.x))
}
