//! Straight reference path

use glam::DVec2;

use crate::error::GeometryError;

/// Segment from `start` to `end`, parametrised by distance from `start`
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    start: DVec2,
    end: DVec2,
    direction: DVec2,
    length: f64,
    angle: f64,
}

impl Line {
    pub fn new(start: DVec2, end: DVec2) -> Result<Self, GeometryError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(GeometryError::NonFinite("line endpoints"));
        }
        let delta = end - start;
        let length = delta.length();
        if length <= 0.0 {
            return Err(GeometryError::ZeroLength);
        }
        Ok(Self {
            start,
            end,
            direction: delta / length,
            length,
            angle: delta.y.atan2(delta.x),
        })
    }

    #[inline]
    pub fn start(&self) -> DVec2 {
        self.start
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Point at distance `s`, extended linearly past either end
    pub fn evaluate(&self, s: f64) -> DVec2 {
        self.start + self.direction * s
    }

    pub fn tangent_angle(&self, _s: f64) -> f64 {
        self.angle
    }

    pub fn closest_s(&self, point: DVec2) -> f64 {
        (point - self.start).dot(self.direction).clamp(0.0, self.length)
    }

    pub fn endpoint(&self) -> DVec2 {
        self.end
    }

    pub fn reverse(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
            direction: -self.direction,
            length: self.length,
            angle: crate::wrap_angle(self.angle + std::f64::consts::PI),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_line_basics() {
        let line = Line::new(DVec2::new(0.0, -10.0), DVec2::new(0.0, 10.0)).unwrap();
        assert_eq!(line.length(), 20.0);
        assert_relative_eq!(line.tangent_angle(3.0), FRAC_PI_2);
        assert_eq!(line.evaluate(5.0), DVec2::new(0.0, -5.0));
        assert_eq!(line.evaluate(-5.0), DVec2::new(0.0, -15.0));
        assert_eq!(line.endpoint(), DVec2::new(0.0, 10.0));
    }

    #[test]
    fn test_line_closest_clamps() {
        let line = Line::new(DVec2::ZERO, DVec2::new(10.0, 0.0)).unwrap();
        assert_eq!(line.closest_s(DVec2::new(4.0, 7.0)), 4.0);
        assert_eq!(line.closest_s(DVec2::new(-4.0, 1.0)), 0.0);
        assert_eq!(line.closest_s(DVec2::new(40.0, 1.0)), 10.0);
    }

    #[test]
    fn test_line_reverse() {
        let line = Line::new(DVec2::ZERO, DVec2::new(10.0, 0.0)).unwrap();
        let rev = line.reverse();
        assert_eq!(rev.evaluate(0.0), DVec2::new(10.0, 0.0));
        assert_relative_eq!(rev.tangent_angle(0.0).abs(), std::f64::consts::PI);
        assert_relative_eq!(rev.closest_s(DVec2::new(2.0, 3.0)), 8.0);
    }

    #[test]
    fn test_zero_length_line_rejected() {
        assert_eq!(Line::new(DVec2::ONE, DVec2::ONE), Err(GeometryError::ZeroLength));
    }

    proptest! {
        #[test]
        fn prop_closest_recovers_parameter(
            x0 in -500.0f64..500.0, y0 in -500.0f64..500.0,
            angle in -3.0f64..3.0, len in 1.0f64..1000.0, t in 0.0f64..1.0,
        ) {
            let start = DVec2::new(x0, y0);
            let line = Line::new(start, start + DVec2::from_angle(angle) * len).unwrap();
            let s = t * line.length();
            prop_assert!((line.closest_s(line.evaluate(s)) - s).abs() < 1e-2);
        }
    }
}
