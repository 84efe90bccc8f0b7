//! Outline generation for 2D primitives

use glam::DVec2;
use std::f64::consts::{FRAC_PI_3, TAU};

use crate::rotate;

/// Hull outline: a pointed bow and square stern, centred on `position`
pub fn vessel_outline(position: DVec2, yaw: f64, length: f64, beam: f64) -> Vec<DVec2> {
    let half_l = length / 2.0;
    let half_b = beam / 2.0;
    // Bow section starts a fifth of the length aft of the tip
    let shoulder = half_l - length / 5.0;

    [
        DVec2::new(half_l, 0.0),
        DVec2::new(shoulder, half_b),
        DVec2::new(-half_l, half_b),
        DVec2::new(-half_l, -half_b),
        DVec2::new(shoulder, -half_b),
    ]
    .into_iter()
    .map(|p| position + rotate(p, yaw))
    .collect()
}

/// Equilateral arrow head whose first vertex points along `angle`
pub fn arrow_head(tip: DVec2, angle: f64, size: f64) -> [DVec2; 3] {
    [0.0, 2.0 * FRAC_PI_3, 4.0 * FRAC_PI_3].map(|offset| tip + DVec2::from_angle(angle + offset) * size)
}

/// Closed polyline approximating a circle (first point repeated at the end)
pub fn circle_outline(center: DVec2, radius: f64, segments: u32) -> Vec<DVec2> {
    let segments = segments.max(3);
    (0..=segments)
        .map(|i| {
            let theta = (i % segments) as f64 / segments as f64 * TAU;
            center + DVec2::from_angle(theta) * radius
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_vessel_outline_bow_follows_heading() {
        let outline = vessel_outline(DVec2::new(10.0, 0.0), FRAC_PI_2, 8.0, 3.0);
        assert_eq!(outline.len(), 5);
        assert_relative_eq!(outline[0].x, 10.0, epsilon = 1e-12);
        assert_relative_eq!(outline[0].y, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_arrow_head_tip() {
        let head = arrow_head(DVec2::ZERO, 0.0, 2.0);
        assert_eq!(head[0], DVec2::new(2.0, 0.0));
        let centroid = (head[0] + head[1] + head[2]) / 3.0;
        assert!(centroid.length() < 1e-12);
    }

    #[test]
    fn test_circle_outline_closed() {
        let pts = circle_outline(DVec2::ONE, 2.0, 16);
        assert_eq!(pts.len(), 17);
        assert_eq!(pts[0], pts[16]);
        for p in &pts {
            assert_relative_eq!(p.distance(DVec2::ONE), 2.0, epsilon = 1e-12);
        }
    }
}
