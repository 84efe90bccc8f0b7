//! Circular obstacles, fixed or travelling along a path

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::path::{Path, PathCurve};

/// Anything the vessel can collide with
pub trait Obstacle {
    fn position(&self) -> DVec2;

    fn radius(&self) -> f64;

    /// World-frame velocity
    fn velocity(&self) -> DVec2 {
        DVec2::ZERO
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticObstacle {
    pub position: DVec2,
    pub radius: f64,
}

impl StaticObstacle {
    pub fn new(position: DVec2, radius: f64) -> Result<Self, GeometryError> {
        if !position.is_finite() || !radius.is_finite() {
            return Err(GeometryError::NonFinite("static obstacle"));
        }
        if radius < 0.0 {
            return Err(GeometryError::NegativeRadius(radius));
        }
        Ok(Self { position, radius })
    }
}

impl Obstacle for StaticObstacle {
    fn position(&self) -> DVec2 {
        self.position
    }

    fn radius(&self) -> f64 {
        self.radius
    }
}

/// Obstacle moving along its own path at constant speed
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicObstacle {
    path: PathCurve,
    speed: f64,
    s: f64,
    radius: f64,
}

impl DynamicObstacle {
    /// Hull width used by the traffic scenarios
    pub const DEFAULT_RADIUS: f64 = 5.0;

    pub fn new(path: PathCurve, speed: f64, initial_s: f64, radius: f64) -> Result<Self, GeometryError> {
        if !speed.is_finite() || !initial_s.is_finite() || !radius.is_finite() {
            return Err(GeometryError::NonFinite("dynamic obstacle"));
        }
        if radius < 0.0 {
            return Err(GeometryError::NegativeRadius(radius));
        }
        Ok(Self {
            path,
            speed,
            s: initial_s,
            radius,
        })
    }

    /// Advance along the path by `speed * dt`
    pub fn step(&mut self, dt: f64) {
        self.s += self.speed * dt;
    }

    #[inline]
    pub fn s(&self) -> f64 {
        self.s
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn path(&self) -> &PathCurve {
        &self.path
    }

    pub fn heading(&self) -> f64 {
        self.path.tangent_angle(self.s)
    }
}

impl Obstacle for DynamicObstacle {
    fn position(&self) -> DVec2 {
        self.path.evaluate(self.s)
    }

    fn radius(&self) -> f64 {
        self.radius
    }

    fn velocity(&self) -> DVec2 {
        DVec2::from_angle(self.heading()) * self.speed
    }
}

/// Obstacles of one episode, in the order collision checks visit them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObstacleSet {
    pub statics: Vec<StaticObstacle>,
    pub dynamics: Vec<DynamicObstacle>,
}

impl ObstacleSet {
    pub fn is_empty(&self) -> bool {
        self.statics.is_empty() && self.dynamics.is_empty()
    }

    pub fn step(&mut self, dt: f64) {
        self.dynamics.iter_mut().for_each(|o| o.step(dt));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_static_obstacle_validation() {
        assert!(StaticObstacle::new(DVec2::ZERO, 0.0).is_ok());
        assert_eq!(
            StaticObstacle::new(DVec2::ZERO, -1.0),
            Err(GeometryError::NegativeRadius(-1.0))
        );
        let o = StaticObstacle::new(DVec2::new(1.0, 2.0), 3.0).unwrap();
        assert_eq!(o.velocity(), DVec2::ZERO);
    }

    #[test]
    fn test_dynamic_obstacle_moves_along_path() {
        let path = PathCurve::line(DVec2::ZERO, DVec2::new(100.0, 0.0)).unwrap();
        let mut o = DynamicObstacle::new(path, 2.0, 20.0, DynamicObstacle::DEFAULT_RADIUS).unwrap();
        for _ in 0..10 {
            o.step(0.5);
        }
        assert_relative_eq!(o.s(), 30.0);
        assert_relative_eq!(o.position().x, 30.0);
        assert_relative_eq!(o.velocity().x, 2.0);
        assert_relative_eq!(o.velocity().y, 0.0);
    }
}
