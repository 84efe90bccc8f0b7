//! Monotone cubic (PCHIP) curve through waypoints, reparametrised by arc length

use glam::DVec2;

use super::minimize::minimize_bounded;
use crate::error::GeometryError;
use crate::wrap_angle;

/// Samples used for each arc-length reparametrisation pass
const RESAMPLE_POINTS: usize = 1000;
const RESAMPLE_PASSES: usize = 3;
/// Half-width of the central difference used for the tangent
const TANGENT_STEP: f64 = 0.05;
/// Grid used to bracket the closest point before refinement
const SCAN_SAMPLES: usize = 256;
const CLOSEST_XTOL: f64 = 1e-6;
const CLOSEST_MAX_EVALUATIONS: usize = 10_000;

/// Piecewise cubic Hermite interpolant of 2D points
#[derive(Debug, Clone, PartialEq)]
pub struct Pchip {
    knots: Vec<f64>,
    values: Vec<DVec2>,
    slopes: Vec<DVec2>,
}

impl Pchip {
    /// `knots` must be strictly increasing and match `values` in length (≥ 2)
    pub fn new(knots: Vec<f64>, values: Vec<DVec2>) -> Result<Self, GeometryError> {
        if knots.len() < 2 || knots.len() != values.len() {
            return Err(GeometryError::TooFewWaypoints(knots.len().min(values.len())));
        }
        if knots.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(GeometryError::TooFewWaypoints(knots.len()));
        }

        let h: Vec<f64> = knots.windows(2).map(|w| w[1] - w[0]).collect();
        let xs: Vec<f64> = values.iter().map(|v| v.x).collect();
        let ys: Vec<f64> = values.iter().map(|v| v.y).collect();
        let dx = pchip_slopes(&h, &xs);
        let dy = pchip_slopes(&h, &ys);
        let slopes = dx.into_iter().zip(dy).map(|(x, y)| DVec2::new(x, y)).collect();

        Ok(Self {
            knots,
            values,
            slopes,
        })
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.knots[0], self.knots[self.knots.len() - 1])
    }

    /// Evaluate; outside the knots the end polynomials are extended
    pub fn evaluate(&self, s: f64) -> DVec2 {
        let last = self.knots.len() - 2;
        let k = self.knots.partition_point(|&x| x <= s).saturating_sub(1).min(last);

        let h = self.knots[k + 1] - self.knots[k];
        let t = s - self.knots[k];
        let y0 = self.values[k];
        let d0 = self.slopes[k];
        let d1 = self.slopes[k + 1];
        let delta = (self.values[k + 1] - y0) / h;

        let c2 = (delta * 3.0 - d0 * 2.0 - d1) / h;
        let c3 = (d0 + d1 - delta * 2.0) / (h * h);
        y0 + d0 * t + c2 * (t * t) + c3 * (t * t * t)
    }
}

/// Sign with zero mapped to zero
#[inline]
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Fritsch–Carlson style slopes with the weighted harmonic mean interior rule
fn pchip_slopes(h: &[f64], y: &[f64]) -> Vec<f64> {
    let n = y.len();
    let m: Vec<f64> = (0..n - 1).map(|k| (y[k + 1] - y[k]) / h[k]).collect();

    if n == 2 {
        return vec![m[0], m[0]];
    }

    let mut d = vec![0.0; n];
    for k in 1..n - 1 {
        let (m0, m1) = (m[k - 1], m[k]);
        if sign(m0) == 0.0 || sign(m0) != sign(m1) {
            continue;
        }
        let w1 = 2.0 * h[k] + h[k - 1];
        let w2 = h[k] + 2.0 * h[k - 1];
        d[k] = (w1 + w2) / (w1 / m0 + w2 / m1);
    }

    d[0] = edge_slope(h[0], h[1], m[0], m[1]);
    d[n - 1] = edge_slope(h[n - 2], h[n - 3], m[n - 2], m[n - 3]);
    d
}

/// One-sided three-point end slope, kept shape-preserving
fn edge_slope(h0: f64, h1: f64, m0: f64, m1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * m0 - h0 * m1) / (h0 + h1);
    if sign(d) != sign(m0) {
        0.0
    } else if sign(m0) != sign(m1) && d.abs() > 3.0 * m0.abs() {
        3.0 * m0
    } else {
        d
    }
}

/// Cumulative chord length, starting at zero
fn arc_lengths(points: &[DVec2]) -> Vec<f64> {
    let mut s = Vec::with_capacity(points.len());
    let mut total = 0.0;
    s.push(0.0);
    for w in points.windows(2) {
        total += w[0].distance(w[1]);
        s.push(total);
    }
    s
}

fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 { (end - start) / (n - 1) as f64 } else { 0.0 };
    (0..n).map(move |i| if i + 1 == n { end } else { start + step * i as f64 })
}

/// Smooth curve through waypoints with (approximate) arc-length parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    interp: Pchip,
    length: f64,
    reversed: bool,
}

impl Spline {
    pub fn new(waypoints: &[DVec2]) -> Result<Self, GeometryError> {
        if waypoints.iter().any(|p| !p.is_finite()) {
            return Err(GeometryError::NonFinite("spline waypoints"));
        }
        let mut points: Vec<DVec2> = Vec::with_capacity(waypoints.len());
        for &p in waypoints {
            if points.last().is_none_or(|&last| last.distance(p) > 0.0) {
                points.push(p);
            }
        }
        if points.len() < 2 {
            return Err(GeometryError::TooFewWaypoints(points.len()));
        }

        let mut knots = arc_lengths(&points);
        let mut interp = Pchip::new(knots.clone(), points)?;
        for _ in 1..RESAMPLE_PASSES {
            let (_, end) = interp.domain();
            let resampled: Vec<DVec2> = linspace(0.0, end, RESAMPLE_POINTS)
                .map(|s| interp.evaluate(s))
                .collect();
            knots = arc_lengths(&resampled);
            interp = Pchip::new(knots.clone(), resampled)?;
        }

        let length = knots[knots.len() - 1];
        Ok(Self {
            interp,
            length,
            reversed: false,
        })
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn evaluate(&self, s: f64) -> DVec2 {
        let s = if self.reversed { self.length - s } else { s };
        self.interp.evaluate(s)
    }

    pub fn tangent_angle(&self, s: f64) -> f64 {
        let d = self.evaluate(s + TANGENT_STEP) - self.evaluate(s - TANGENT_STEP);
        wrap_angle(d.y.atan2(d.x))
    }

    /// Arc length of the closest point, searched over `[0, length]`
    pub fn closest_s(&self, point: DVec2) -> f64 {
        let distance = |s: f64| self.evaluate(s).distance(point);
        let step = self.length / SCAN_SAMPLES as f64;

        let best = (0..=SCAN_SAMPLES)
            .map(|i| (i, distance(step * i as f64)))
            .fold((0, f64::INFINITY), |acc, (i, d)| if d < acc.1 { (i, d) } else { acc });

        let lower = (best.0.saturating_sub(1) as f64 * step).max(0.0);
        let upper = ((best.0 + 1) as f64 * step).min(self.length);
        minimize_bounded(distance, lower, upper, CLOSEST_XTOL, CLOSEST_MAX_EVALUATIONS).x
    }

    pub fn reverse(&self) -> Self {
        Self {
            interp: self.interp.clone(),
            length: self.length,
            reversed: !self.reversed,
        }
    }
}
