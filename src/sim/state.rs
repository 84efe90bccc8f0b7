//! Vessel state, control reference, actions and the episode RNG

use glam::{DVec2, DVec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::wrap_angle;

/// Snapshot of the vessel's pose and body-frame velocity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VesselState {
    pub x: f64,
    pub y: f64,
    /// Heading, always within (-π, π]
    pub yaw: f64,
    pub surge: f64,
    pub sway: f64,
    pub yawrate: f64,
}

impl VesselState {
    /// Vessel at rest at the given pose
    pub fn at_rest(position: DVec2, yaw: f64) -> Self {
        Self {
            x: position.x,
            y: position.y,
            yaw: wrap_angle(yaw),
            ..Default::default()
        }
    }

    pub fn from_vectors(eta: DVec3, nu: DVec3) -> Self {
        Self {
            x: eta.x,
            y: eta.y,
            yaw: wrap_angle(eta.z),
            surge: nu.x,
            sway: nu.y,
            yawrate: nu.z,
        }
    }

    #[inline]
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Pose `[x, y, yaw]`
    #[inline]
    pub fn eta(&self) -> DVec3 {
        DVec3::new(self.x, self.y, self.yaw)
    }

    /// Body-frame velocity `[surge, sway, yawrate]`
    #[inline]
    pub fn nu(&self) -> DVec3 {
        DVec3::new(self.surge, self.sway, self.yawrate)
    }

    /// Velocity in the world frame
    pub fn world_velocity(&self) -> DVec2 {
        crate::rotate(DVec2::new(self.surge, self.sway), self.yaw)
    }

    pub fn as_array(&self) -> [f64; 6] {
        [self.x, self.y, self.yaw, self.surge, self.sway, self.yawrate]
    }
}

/// Desired surge speed and heading tracked by the vessel
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlReference {
    pub desired_surge: f64,
    pub desired_heading: f64,
}

/// Normalised command: surge in [0, 1], steer in [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Action {
    pub surge: f64,
    pub steer: f64,
}

impl Action {
    pub fn new(surge: f64, steer: f64) -> Self {
        Self { surge, steer }
    }

    /// Clamp into the valid command box, logging when anything was changed
    pub fn clamped(self) -> Self {
        let surge = if self.surge.is_finite() { self.surge.clamp(0.0, 1.0) } else { 0.0 };
        let steer = if self.steer.is_finite() { self.steer.clamp(-1.0, 1.0) } else { 0.0 };
        let clamped = Self { surge, steer };
        if clamped != self {
            log::warn!("Action {:?} clamped to {:?}", self, clamped);
        }
        clamped
    }
}

impl From<[f64; 2]> for Action {
    fn from(a: [f64; 2]) -> Self {
        Self::new(a[0], a[1])
    }
}

/// Seeded random source for one episode
///
/// All scenario generation and slot tie-breaking draws from here so that a
/// seed fully determines an episode.
#[derive(Debug, Clone)]
pub struct EpisodeRng {
    seed: u64,
    rng: Pcg32,
}

impl EpisodeRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform sample in [0, 1)
    pub fn uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Uniform sample in [-half_width, half_width)
    pub fn symmetric(&mut self, half_width: f64) -> f64 {
        2.0 * half_width * (self.uniform() - 0.5)
    }

    /// Integer in [low, high)
    pub fn int_range(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        self.rng.random_range(low..high)
    }

    /// Index into a collection of `len` items, `None` when empty
    pub fn choose_index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.random_range(0..len))
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        self.choose_index(items.len()).map(|i| &items[i])
    }
}
