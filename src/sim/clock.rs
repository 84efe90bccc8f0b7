//! Fixed-step simulation clock
//!
//! One clock per environment. Blocks hold a cloned handle so they all read the
//! same time and step size; the environment is the only caller of `step`.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::ConfigError;

#[derive(Debug)]
struct ClockInner {
    time: Cell<f64>,
    dt: f64,
}

/// Shared handle to a fixed-step clock
#[derive(Debug, Clone)]
pub struct Clock {
    inner: Rc<ClockInner>,
}

impl Clock {
    /// Create a clock at time zero with a fixed step size
    pub fn new(step_size: f64) -> Result<Self, ConfigError> {
        if !step_size.is_finite() || step_size <= 0.0 {
            return Err(ConfigError::NonPositiveStepSize(step_size));
        }
        Ok(Self {
            inner: Rc::new(ClockInner {
                time: Cell::new(0.0),
                dt: step_size,
            }),
        })
    }

    /// Advance by one step and return the new time
    pub fn step(&self) -> f64 {
        let t = self.inner.time.get() + self.inner.dt;
        self.inner.time.set(t);
        t
    }

    pub fn reset(&self) {
        self.inner.time.set(0.0);
    }

    #[inline]
    pub fn time(&self) -> f64 {
        self.inner.time.get()
    }

    #[inline]
    pub fn dt(&self) -> f64 {
        self.inner.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clock_rejects_bad_step() {
        assert!(Clock::new(0.0).is_err());
        assert!(Clock::new(-0.1).is_err());
        assert!(Clock::new(f64::NAN).is_err());
    }

    #[test]
    fn test_clock_steps_and_resets() {
        let clock = Clock::new(0.05).unwrap();
        for _ in 0..10 {
            clock.step();
        }
        assert_relative_eq!(clock.time(), 0.5, epsilon = 1e-12);
        clock.reset();
        assert_eq!(clock.time(), 0.0);
        assert_eq!(clock.dt(), 0.05);
    }

    #[test]
    fn test_clock_handles_share_time() {
        let clock = Clock::new(0.1).unwrap();
        let handle = clock.clone();
        clock.step();
        assert_relative_eq!(handle.time(), 0.1);
    }
}
