//! Discrete-time signal blocks
//!
//! Each block is invoked once per tick, in the order the owning model defines.
//! Blocks that depend on the step size read it from the shared [`Clock`].

use std::collections::VecDeque;
use std::ops::{Add, Mul};

use super::clock::Clock;
use crate::error::ConfigError;

/// Forward-Euler accumulator: `value += x * dt`
///
/// Works for scalars and for `glam` vectors.
#[derive(Debug, Clone)]
pub struct Integrator<T> {
    clock: Clock,
    value: T,
}

impl<T> Integrator<T>
where
    T: Copy + Add<Output = T> + Mul<f64, Output = T>,
{
    pub fn new(clock: &Clock, initial: T) -> Self {
        Self {
            clock: clock.clone(),
            value: initial,
        }
    }

    /// Accumulate one step of `x` and return the new value
    pub fn integrate(&mut self, x: T) -> T {
        self.value = self.value + x * self.clock.dt();
        self.value
    }

    #[inline]
    pub fn value(&self) -> T {
        self.value
    }

    pub fn reset(&mut self, value: T) {
        self.value = value;
    }
}

/// Smoothed finite-difference estimate over a sliding window
#[derive(Debug, Clone)]
pub struct Derivative {
    clock: Clock,
    window: VecDeque<f64>,
}

impl Derivative {
    pub const DEFAULT_WINDOW: usize = 3;

    pub fn with_window(clock: &Clock, samples: usize) -> Result<Self, ConfigError> {
        if samples < 2 {
            return Err(ConfigError::InvalidWindow(samples));
        }
        Ok(Self {
            clock: clock.clone(),
            window: VecDeque::from(vec![0.0; samples]),
        })
    }

    /// Fill the window with a constant so the next estimate starts from rest
    pub fn prime(&mut self, value: f64) {
        self.window.iter_mut().for_each(|v| *v = value);
    }

    /// Shift in a new sample and return the mean slope across the window
    pub fn update(&mut self, value: f64) -> f64 {
        self.window.pop_front();
        self.window.push_back(value);

        let dt = self.clock.dt();
        let diffs = self.window.len() - 1;
        let sum: f64 = self
            .window
            .iter()
            .zip(self.window.iter().skip(1))
            .map(|(a, b)| (b - a) / dt)
            .sum();
        sum / diffs as f64
    }
}

/// Clamp to `[min, max]`
#[derive(Debug, Clone, Copy)]
pub struct Saturation {
    max: f64,
    min: f64,
}

impl Saturation {
    /// Symmetric limits `[-max, max]`
    pub fn new(max: f64) -> Result<Self, ConfigError> {
        Self::with_bounds(max, -max)
    }

    pub fn with_bounds(max: f64, min: f64) -> Result<Self, ConfigError> {
        if max <= min || max.is_nan() || min.is_nan() {
            return Err(ConfigError::InvertedBounds { max, min });
        }
        Ok(Self { max, min })
    }

    #[inline]
    pub fn apply(&self, x: f64) -> f64 {
        x.clamp(self.min, self.max)
    }
}

/// Limits the change between consecutive outputs to `[falling, rising]`
///
/// The limits are per call, not per second.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    rising: f64,
    falling: f64,
    previous: f64,
}

impl RateLimiter {
    /// Symmetric limits `[-rising, rising]`
    pub fn new(rising: f64) -> Result<Self, ConfigError> {
        Self::with_bounds(rising, -rising)
    }

    pub fn with_bounds(rising: f64, falling: f64) -> Result<Self, ConfigError> {
        if !(rising > 0.0 && falling < 0.0) {
            return Err(ConfigError::InvalidRateBounds { rising, falling });
        }
        Ok(Self {
            rising,
            falling,
            previous: 0.0,
        })
    }

    /// Set the previous output without rate limiting
    pub fn prime(&mut self, value: f64) {
        self.previous = value;
    }

    pub fn limit(&mut self, x: f64) -> f64 {
        let delta = (x - self.previous).clamp(self.falling, self.rising);
        self.previous += delta;
        self.previous
    }

    #[inline]
    pub fn previous(&self) -> f64 {
        self.previous
    }
}
