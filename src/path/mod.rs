//! Arc-length parametrised reference paths
//!
//! All paths are immutable once built. `s` runs over `[0, length]`; evaluation
//! outside that range extrapolates.

pub mod circle;
pub mod line;
pub mod minimize;
pub mod spline;

pub use circle::Circle;
pub use line::Line;
pub use minimize::{Minimum, minimize_bounded};
pub use spline::{Pchip, Spline};

use glam::DVec2;
use std::f64::consts::PI;

use crate::error::GeometryError;
use crate::polar_to_cartesian;
use crate::sim::state::EpisodeRng;

/// Geometry queries shared by every path shape
pub trait Path {
    fn evaluate(&self, s: f64) -> DVec2;

    /// Direction of travel at `s`, in (-π, π]
    fn tangent_angle(&self, s: f64) -> f64;

    fn length(&self) -> f64;

    /// Arc length of the point on the path closest to `point`
    fn closest_s(&self, point: DVec2) -> f64;

    /// Closed paths start where they end
    fn is_closed(&self) -> bool {
        false
    }

    /// Projection kept continuous with `hint`, the previous arc length
    ///
    /// On a closed path the lap is chosen so the result lies within half a
    /// length of `hint`; open paths project as `closest_s`.
    fn closest_s_near(&self, point: DVec2, hint: f64) -> f64 {
        let s = self.closest_s(point);
        if !self.is_closed() || !hint.is_finite() {
            return s;
        }
        let length = self.length();
        let laps = ((hint - s) / length).round();
        s + laps * length
    }

    fn endpoint(&self) -> DVec2 {
        self.evaluate(self.length())
    }

    /// `n` evenly spaced points from start to end
    fn sample(&self, n: usize) -> Vec<DVec2> {
        match n {
            0 => Vec::new(),
            1 => vec![self.evaluate(0.0)],
            _ => {
                let step = self.length() / (n - 1) as f64;
                (0..n).map(|i| self.evaluate(step * i as f64)).collect()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathCurve {
    Line(Line),
    Circle(Circle),
    Spline(Spline),
}

impl PathCurve {
    pub fn line(start: DVec2, end: DVec2) -> Result<Self, GeometryError> {
        Line::new(start, end).map(Self::Line)
    }

    pub fn circle(center: DVec2, radius: f64) -> Result<Self, GeometryError> {
        Circle::new(center, radius).map(Self::Circle)
    }

    pub fn spline(waypoints: &[DVec2]) -> Result<Self, GeometryError> {
        Spline::new(waypoints).map(Self::Spline)
    }

    /// Same geometry traversed end to start
    pub fn reverse(&self) -> Self {
        match self {
            Self::Line(l) => Self::Line(l.reverse()),
            Self::Circle(c) => Self::Circle(c.reverse()),
            Self::Spline(c) => Self::Spline(c.reverse()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Line(_) => "line",
            Self::Circle(_) => "circle",
            Self::Spline(_) => "spline",
        }
    }
}

impl Path for PathCurve {
    fn evaluate(&self, s: f64) -> DVec2 {
        match self {
            Self::Line(l) => l.evaluate(s),
            Self::Circle(c) => c.evaluate(s),
            Self::Spline(c) => c.evaluate(s),
        }
    }

    fn tangent_angle(&self, s: f64) -> f64 {
        match self {
            Self::Line(l) => l.tangent_angle(s),
            Self::Circle(c) => c.tangent_angle(s),
            Self::Spline(c) => c.tangent_angle(s),
        }
    }

    fn length(&self) -> f64 {
        match self {
            Self::Line(l) => l.length(),
            Self::Circle(c) => c.length(),
            Self::Spline(c) => c.length(),
        }
    }

    fn closest_s(&self, point: DVec2) -> f64 {
        if !point.is_finite() {
            return 0.0;
        }
        match self {
            Self::Line(l) => l.closest_s(point),
            Self::Circle(c) => c.closest_s(point),
            Self::Spline(c) => c.closest_s(point),
        }
    }

    fn is_closed(&self) -> bool {
        matches!(self, Self::Circle(_))
    }

    fn endpoint(&self) -> DVec2 {
        match self {
            Self::Line(l) => l.endpoint(),
            Self::Circle(c) => c.endpoint(),
            Self::Spline(c) => c.evaluate(c.length()),
        }
    }
}

/// Line of `length` through `origin` at a whole-degree random angle
pub fn random_line_through_origin(
    rng: &mut EpisodeRng,
    length: f64,
    origin: DVec2,
) -> Result<PathCurve, GeometryError> {
    let angle = PI * rng.int_range(0, 360) as f64 / 180.0;
    let start = polar_to_cartesian(length / 2.0, angle) + origin;
    PathCurve::line(start, -start)
}

/// Smooth curve from `start` through the origin to `end` (default `-start`)
///
/// The two intermediate waypoints sit near the midpoints of each half, shifted
/// by up to a quarter of that half's length.
pub fn random_curve_through_origin(
    rng: &mut EpisodeRng,
    start: DVec2,
    end: Option<DVec2>,
) -> Result<PathCurve, GeometryError> {
    let end = end.unwrap_or(-start);
    let mut mid = [DVec2::ZERO; 2];
    for (slot, v) in mid.iter_mut().zip([start, end]) {
        let shift = v.length() / 4.0 * (rng.uniform() - 0.5);
        *slot = v / 2.0 + DVec2::splat(shift);
    }
    PathCurve::spline(&[start, mid[0], DVec2::ZERO, mid[1], end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sample_counts_and_ends() {
        let path = PathCurve::line(DVec2::ZERO, DVec2::new(10.0, 0.0)).unwrap();
        let pts = path.sample(11);
        assert_eq!(pts.len(), 11);
        assert_eq!(pts[0], DVec2::ZERO);
        assert_eq!(pts[10], DVec2::new(10.0, 0.0));
        assert!(path.sample(0).is_empty());
        assert_eq!(path.sample(1).len(), 1);
    }

    #[test]
    fn test_enum_dispatch_and_reverse() {
        let path = PathCurve::circle(DVec2::ZERO, 50.0).unwrap();
        assert_eq!(path.kind(), "circle");
        let rev = path.reverse();
        assert_relative_eq!(rev.length(), path.length());
        assert!(rev.evaluate(10.0).distance(path.evaluate(path.length() - 10.0)) < 1e-9);
    }

    #[test]
    fn test_closed_path_projection_follows_hint() {
        let circle = PathCurve::circle(DVec2::ZERO, 300.0).unwrap();
        assert!(circle.is_closed());
        let length = circle.length();

        // Just behind the start stays just behind, not a lap ahead
        let behind = DVec2::new(300.0, -0.5);
        assert_relative_eq!(circle.closest_s(behind), length - 0.5, epsilon = 1e-3);
        assert!(circle.closest_s_near(behind, 0.0) < 0.0);
        assert_relative_eq!(circle.closest_s_near(behind, 0.0), -0.5, epsilon = 1e-3);

        // Crossing the start from the end of a lap continues past length
        let ahead = DVec2::new(300.0, 0.5);
        assert_relative_eq!(circle.closest_s_near(ahead, length - 1.0), length + 0.5, epsilon = 1e-3);

        let line = PathCurve::line(DVec2::ZERO, DVec2::new(10.0, 0.0)).unwrap();
        assert!(!line.is_closed());
        assert_eq!(line.closest_s_near(DVec2::new(4.0, 1.0), 100.0), 4.0);
    }

    #[test]
    fn test_non_finite_point_projects_to_start() {
        let path = PathCurve::line(DVec2::ZERO, DVec2::X).unwrap();
        assert_eq!(path.closest_s(DVec2::new(f64::NAN, 0.0)), 0.0);
    }

    #[test]
    fn test_random_line_through_origin() {
        let mut rng = EpisodeRng::new(3);
        let path = random_line_through_origin(&mut rng, 100.0, DVec2::ZERO).unwrap();
        assert_relative_eq!(path.length(), 100.0, epsilon = 1e-9);
        let mid = path.evaluate(50.0);
        assert!(mid.length() < 1e-9);
    }

    #[test]
    fn test_random_curve_through_origin() {
        let mut rng = EpisodeRng::new(11);
        let start = DVec2::new(-200.0, 0.0);
        let path = random_curve_through_origin(&mut rng, start, None).unwrap();
        assert!(path.evaluate(0.0).distance(start) < 1e-6);
        assert!(path.endpoint().distance(-start) < 1e-6);
        assert!(path.length() >= 400.0 - 1e-6);
        let s0 = path.closest_s(DVec2::ZERO);
        assert!(path.evaluate(s0).length() < 1e-3);
    }

    #[test]
    fn test_random_paths_deterministic() {
        let a = random_curve_through_origin(&mut EpisodeRng::new(5), DVec2::new(0.0, 200.0), None).unwrap();
        let b = random_curve_through_origin(&mut EpisodeRng::new(5), DVec2::new(0.0, 200.0), None).unwrap();
        assert_eq!(a, b);
    }
}
