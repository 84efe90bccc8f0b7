//! Scenario generators
//!
//! A scenario draws the reference path, desired speed and obstacles of one
//! episode from the episode RNG. The objective perturbs the start pose.

use glam::DVec2;
use std::f64::consts::TAU;

use crate::error::ScenarioError;
use crate::path::{Path, PathCurve, random_curve_through_origin, random_line_through_origin};
use crate::polar_to_cartesian;
use crate::sim::obstacle::{DynamicObstacle, ObstacleSet, StaticObstacle};
use crate::sim::state::EpisodeRng;

/// Speed every built-in scenario asks for (m/s)
pub const DEFAULT_SPEED: f64 = 4.0;
/// Distance of curved path starts from the origin
const CURVE_START_RADIUS: f64 = 400.0;

pub type ScenarioFn = fn(&mut EpisodeRng) -> Result<Scenario, ScenarioError>;

/// Generation output of one episode
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// `None` lets the objective draw a random curve
    pub path: Option<PathCurve>,
    pub desired_speed: f64,
    pub obstacles: ObstacleSet,
    /// Whether the feedback-linearising controller drives the vessel
    pub use_controller: bool,
    /// Surge the vessel starts the episode with
    pub initial_surge: f64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            path: None,
            desired_speed: DEFAULT_SPEED,
            obstacles: ObstacleSet::default(),
            use_controller: true,
            initial_surge: 0.0,
        }
    }
}

impl Scenario {
    pub fn on_path(path: PathCurve) -> Self {
        Self {
            path: Some(path),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if !(self.desired_speed >= 0.0 && self.desired_speed.is_finite()) {
            return Err(ScenarioError::InvalidSpeed(self.desired_speed));
        }
        if !(self.initial_surge >= 0.0 && self.initial_surge.is_finite()) {
            return Err(ScenarioError::InvalidSpeed(self.initial_surge));
        }
        Ok(())
    }
}

/// Curve from a random point at `radius` through the origin to its mirror
fn random_curve(rng: &mut EpisodeRng, radius: f64) -> Result<PathCurve, ScenarioError> {
    let angle = TAU * (rng.uniform() - 0.5);
    Ok(random_curve_through_origin(rng, polar_to_cartesian(radius, angle), None)?)
}

/// Obstacle scattered within ±50 of a point on the last 90% of `path`
fn scattered_obstacle(rng: &mut EpisodeRng, path: &PathCurve) -> Result<StaticObstacle, ScenarioError> {
    let s = 0.9 * path.length() * (rng.uniform() + 0.1);
    let offset = DVec2::new(rng.symmetric(50.0), rng.symmetric(50.0));
    let radius = 10.0 * (rng.uniform() + 0.5);
    Ok(StaticObstacle::new(path.evaluate(s) + offset, radius)?)
}

fn traffic(path: PathCurve, speed: f64, initial_s: f64) -> Result<DynamicObstacle, ScenarioError> {
    Ok(DynamicObstacle::new(path, speed, initial_s, DynamicObstacle::DEFAULT_RADIUS)?)
}

/// Straight path with one static obstacle and one ship sharing the lane
pub fn example(rng: &mut EpisodeRng) -> Result<Scenario, ScenarioError> {
    let path = random_line_through_origin(rng, 500.0, DVec2::ZERO)?;
    let mut scenario = Scenario::on_path(path.clone());
    scenario
        .obstacles
        .statics
        .push(StaticObstacle::new(path.evaluate(100.0), 10.0)?);
    scenario.obstacles.dynamics.push(traffic(path, 4.0, 50.0)?);
    Ok(scenario)
}

pub fn straight_path(rng: &mut EpisodeRng) -> Result<Scenario, ScenarioError> {
    Ok(Scenario::on_path(random_line_through_origin(rng, 500.0, DVec2::ZERO)?))
}

pub fn curved_path(rng: &mut EpisodeRng) -> Result<Scenario, ScenarioError> {
    Ok(Scenario::on_path(random_curve(rng, CURVE_START_RADIUS)?))
}

pub fn circular_path(_rng: &mut EpisodeRng) -> Result<Scenario, ScenarioError> {
    Ok(Scenario::on_path(PathCurve::circle(DVec2::ZERO, 300.0)?))
}

/// Slower ship ahead on the same straight lane
pub fn straight_path_overtaking(rng: &mut EpisodeRng) -> Result<Scenario, ScenarioError> {
    let angle = TAU * (rng.uniform() - 0.5);
    let start = polar_to_cartesian(CURVE_START_RADIUS, angle);
    let path = PathCurve::line(start, -start)?;
    let mut scenario = Scenario::on_path(path.clone());
    scenario.obstacles.dynamics.push(traffic(path, 2.0, 20.0)?);
    Ok(scenario)
}

pub fn curved_path_overtaking(rng: &mut EpisodeRng) -> Result<Scenario, ScenarioError> {
    let path = random_curve(rng, CURVE_START_RADIUS)?;
    let mut scenario = Scenario::on_path(path.clone());
    scenario.obstacles.dynamics.push(traffic(path, 2.0, 20.0)?);
    Ok(scenario)
}

/// Oncoming ship travelling the lane in reverse
pub fn straight_path_ship_collision(rng: &mut EpisodeRng) -> Result<Scenario, ScenarioError> {
    let path = random_line_through_origin(rng, 400.0, DVec2::ZERO)?;
    let mut scenario = Scenario::on_path(path.clone());
    scenario.obstacles.dynamics.push(traffic(path.reverse(), 2.0, 20.0)?);
    Ok(scenario)
}

pub fn curved_path_ship_collision(rng: &mut EpisodeRng) -> Result<Scenario, ScenarioError> {
    let path = random_curve(rng, CURVE_START_RADIUS)?;
    let mut scenario = Scenario::on_path(path.clone());
    scenario.obstacles.dynamics.push(traffic(path.reverse(), 2.0, 20.0)?);
    Ok(scenario)
}

/// Ten obstacles scattered along a curve, driven open loop
pub fn curved_path_static_obstacles(rng: &mut EpisodeRng) -> Result<Scenario, ScenarioError> {
    let path = random_curve(rng, CURVE_START_RADIUS)?;
    let statics = (0..10)
        .map(|_| scattered_obstacle(rng, &path))
        .collect::<Result<Vec<_>, _>>()?;
    let mut scenario = Scenario::on_path(path);
    scenario.obstacles.statics = statics;
    scenario.use_controller = false;
    Ok(scenario)
}

/// Random static obstacles plus up to two ships on the curve or its chord
pub fn curved_path_static_dynamic_obstacles(rng: &mut EpisodeRng) -> Result<Scenario, ScenarioError> {
    let path = random_curve(rng, CURVE_START_RADIUS)?;
    let chord = PathCurve::line(path.evaluate(0.0), path.endpoint())?;

    let n_static = rng.int_range(5, 20);
    let statics = (0..n_static)
        .map(|_| scattered_obstacle(rng, &path))
        .collect::<Result<Vec<_>, _>>()?;

    // Most episodes have no traffic: counts below zero mean none
    let n_dynamic = rng.int_range(-10, 3).max(0);
    let lanes = [path.clone(), path.reverse(), chord.clone(), chord.reverse()];
    let mut dynamics = Vec::new();
    for _ in 0..n_dynamic {
        let initial_s = 0.9 * path.length() * (rng.uniform() + 0.1);
        let speed = (rng.uniform() + 1.0 / 6.0) * 6.0;
        if let Some(lane) = rng.choose(&lanes) {
            dynamics.push(traffic(lane.clone(), speed, initial_s)?);
        }
    }

    let mut scenario = Scenario::on_path(path);
    scenario.obstacles = ObstacleSet { statics, dynamics };
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacle::Obstacle;
    use approx::assert_relative_eq;

    const ALL: [ScenarioFn; 10] = [
        example,
        straight_path,
        curved_path,
        circular_path,
        straight_path_overtaking,
        curved_path_overtaking,
        straight_path_ship_collision,
        curved_path_ship_collision,
        curved_path_static_obstacles,
        curved_path_static_dynamic_obstacles,
    ];

    #[test]
    fn test_every_scenario_generates_valid_output() {
        for seed in 0..20 {
            for generate in ALL {
                let scenario = generate(&mut EpisodeRng::new(seed)).unwrap();
                scenario.validate().unwrap();
                assert!(scenario.path.is_some());
                assert_eq!(scenario.desired_speed, DEFAULT_SPEED);
            }
        }
    }

    #[test]
    fn test_generation_reproducible() {
        let a = curved_path_static_dynamic_obstacles(&mut EpisodeRng::new(11)).unwrap();
        let b = curved_path_static_dynamic_obstacles(&mut EpisodeRng::new(11)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_example_layout() {
        let scenario = example(&mut EpisodeRng::new(2)).unwrap();
        let path = scenario.path.as_ref().unwrap();
        assert_relative_eq!(path.length(), 500.0, epsilon = 1e-9);
        assert_eq!(scenario.obstacles.statics.len(), 1);
        assert!(scenario.obstacles.statics[0].position.distance(path.evaluate(100.0)) < 1e-9);
        assert_eq!(scenario.obstacles.dynamics[0].s(), 50.0);
    }

    #[test]
    fn test_ship_collision_traffic_is_oncoming() {
        let scenario = straight_path_ship_collision(&mut EpisodeRng::new(5)).unwrap();
        let path = scenario.path.as_ref().unwrap();
        let ship = &scenario.obstacles.dynamics[0];
        let along = DVec2::from_angle(path.tangent_angle(0.0));
        assert!(ship.velocity().dot(along) < 0.0);
        assert!(ship.position().distance(path.endpoint()) < 20.0 + 1e-6);
    }

    #[test]
    fn test_static_obstacle_counts() {
        let scenario = curved_path_static_obstacles(&mut EpisodeRng::new(3)).unwrap();
        assert_eq!(scenario.obstacles.statics.len(), 10);
        assert!(!scenario.use_controller);
        for o in &scenario.obstacles.statics {
            assert!(o.radius >= 5.0 && o.radius < 15.0);
        }

        for seed in 0..30 {
            let scenario = curved_path_static_dynamic_obstacles(&mut EpisodeRng::new(seed)).unwrap();
            let n = scenario.obstacles.statics.len();
            assert!((5..20).contains(&n));
            assert!(scenario.obstacles.dynamics.len() <= 2);
        }
    }

    #[test]
    fn test_validate_rejects_bad_speed() {
        let scenario = Scenario {
            desired_speed: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(scenario.validate(), Err(ScenarioError::InvalidSpeed(_))));
    }
}
