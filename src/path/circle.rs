//! Circular reference path

use glam::DVec2;
use std::f64::consts::{FRAC_PI_2, TAU};

use crate::error::GeometryError;
use crate::{cartesian_to_polar, polar_to_cartesian, wrap_angle};

/// Full circle starting at polar angle `phase`, counter-clockwise unless reversed
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    center: DVec2,
    radius: f64,
    phase: f64,
    /// +1 counter-clockwise, -1 clockwise
    direction: f64,
}

impl Circle {
    pub fn new(center: DVec2, radius: f64) -> Result<Self, GeometryError> {
        if !center.is_finite() || !radius.is_finite() {
            return Err(GeometryError::NonFinite("circle"));
        }
        if radius <= 0.0 {
            return Err(GeometryError::NonPositiveRadius(radius));
        }
        Ok(Self {
            center,
            radius,
            phase: 0.0,
            direction: 1.0,
        })
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub fn length(&self) -> f64 {
        TAU * self.radius
    }

    fn polar_angle(&self, s: f64) -> f64 {
        self.phase + self.direction * s / self.radius
    }

    pub fn evaluate(&self, s: f64) -> DVec2 {
        self.center + polar_to_cartesian(self.radius, self.polar_angle(s))
    }

    pub fn tangent_angle(&self, s: f64) -> f64 {
        wrap_angle(self.polar_angle(s) + self.direction * FRAC_PI_2)
    }

    /// Closest arc length in `[0, length)`; the center maps to 0
    pub fn closest_s(&self, point: DVec2) -> f64 {
        let (r, theta) = cartesian_to_polar(point - self.center);
        if r == 0.0 {
            return 0.0;
        }
        let s = (self.direction * (theta - self.phase)).rem_euclid(TAU) * self.radius;
        if s >= self.length() { 0.0 } else { s }
    }

    pub fn endpoint(&self) -> DVec2 {
        self.evaluate(self.length())
    }

    pub fn reverse(&self) -> Self {
        Self {
            direction: -self.direction,
            ..self.clone()
        }
    }
}
