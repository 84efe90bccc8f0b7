//! Path-following objective
//!
//! Each evaluation projects the vessel onto the path, refreshes the obstacle
//! slots, builds the bounded observation and shapes the reward. Collision and
//! leaving the playfield end the episode with a penalty; otherwise the step
//! pays progress minus tracking penalties, and arriving at the end of the path
//! ends the episode after that step. The failure floor is applied to the
//! cumulative reward last.
//!
//! Closed paths are projected continuously with the previous arc length, and
//! arrival only counts once the vessel has covered half the path.

use glam::DVec2;
use std::f64::consts::{PI, TAU};

use super::slots::SlotTable;
use super::{Evaluation, Objective, ObjectiveConfig, ObjectivePhase};
use crate::consts::{BASE_OBSERVATION_LEN, DYNAMIC_SLOT_LEN, PATH_SAMPLES, STATIC_SLOT_LEN};
use crate::error::{ConfigError, ScenarioError};
use crate::path::{Path, PathCurve, random_curve_through_origin};
use crate::renderer::{PATH_COLOR, PROGRESS_COLOR, Viewer};
use crate::sim::clock::Clock;
use crate::sim::collision::{ObstacleKind, vessel_collision};
use crate::sim::obstacle::{Obstacle, ObstacleSet};
use crate::sim::state::{Action, EpisodeRng, VesselState};
use crate::{polar_to_cartesian, rotate, wrap_angle};

/// Path and tracking errors before normalisation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingErrors {
    pub surge: f64,
    pub heading: f64,
    pub cross_track: f64,
    pub target_distance: f64,
}

#[derive(Debug, Clone)]
pub struct PathFollowing {
    config: ObjectiveConfig,
    clock: Clock,
    rng: EpisodeRng,
    path: Option<PathCurve>,
    path_points: Vec<DVec2>,
    desired_speed: f64,
    obstacles: ObstacleSet,
    static_slots: SlotTable,
    dynamic_slots: SlotTable,
    cumulative_reward: f64,
    s: f64,
    last_ds: f64,
    /// Set once `s` reaches half the path length
    halfway: bool,
    phase: ObjectivePhase,
    last_observation: Vec<f64>,
}

impl PathFollowing {
    pub const NAME: &'static str = "path_following";

    pub fn new(clock: &Clock, config: ObjectiveConfig) -> Result<Self, ConfigError> {
        let positive = [
            ("max_surge", config.max_surge),
            ("lookahead", config.lookahead),
            ("obstacle_range", config.obstacle_range),
            ("progress_divisor", config.progress_divisor),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::InvalidSetting {
                    name,
                    reason: format!("must be positive, got {value}"),
                });
            }
        }
        if !(config.range_hysteresis >= 1.0) {
            return Err(ConfigError::InvalidSetting {
                name: "range_hysteresis",
                reason: format!("must be at least 1, got {}", config.range_hysteresis),
            });
        }
        if !(config.vessel_radius >= 0.0) {
            return Err(ConfigError::InvalidSetting {
                name: "vessel_radius",
                reason: format!("must be non-negative, got {}", config.vessel_radius),
            });
        }

        Ok(Self {
            config,
            clock: clock.clone(),
            rng: EpisodeRng::new(0),
            path: None,
            path_points: Vec::new(),
            desired_speed: 0.0,
            obstacles: ObstacleSet::default(),
            static_slots: SlotTable::new(config.static_slots),
            dynamic_slots: SlotTable::new(config.dynamic_slots),
            cumulative_reward: 0.0,
            s: 0.0,
            last_ds: 0.0,
            halfway: false,
            phase: ObjectivePhase::Init,
            last_observation: vec![0.0; config.observation_len()],
        })
    }

    pub fn config(&self) -> &ObjectiveConfig {
        &self.config
    }

    /// Arc length of the last projection
    pub fn s(&self) -> f64 {
        self.s
    }

    pub fn last_ds(&self) -> f64 {
        self.last_ds
    }

    pub fn cumulative_reward(&self) -> f64 {
        self.cumulative_reward
    }

    pub fn desired_speed(&self) -> f64 {
        self.desired_speed
    }

    pub fn static_slots(&self) -> &SlotTable {
        &self.static_slots
    }

    pub fn dynamic_slots(&self) -> &SlotTable {
        &self.dynamic_slots
    }

    fn update_slots(&mut self, position: DVec2) {
        let range = self.config.obstacle_range;
        let hysteresis = self.config.range_hysteresis;

        let distances: Vec<f64> = self
            .obstacles
            .statics
            .iter()
            .map(|o| position.distance(o.position()))
            .collect();
        self.static_slots.update(&distances, range, hysteresis, &mut self.rng);

        let distances: Vec<f64> = self
            .obstacles
            .dynamics
            .iter()
            .map(|o| position.distance(o.position()))
            .collect();
        self.dynamic_slots.update(&distances, range, hysteresis, &mut self.rng);
    }

    /// Errors of `measured` relative to the path at the current `s`
    pub fn tracking_errors(&self, path: &PathCurve, measured: &VesselState) -> TrackingErrors {
        let position = measured.position();
        let target_s = self.s + self.config.lookahead;
        let target = path.evaluate(target_s);
        let target_angle = path.tangent_angle(target_s);

        let closest = path.evaluate(self.s);
        let path_angle = path.tangent_angle(self.s);

        TrackingErrors {
            surge: self.desired_speed - measured.surge,
            heading: wrap_angle(target_angle - measured.yaw),
            cross_track: rotate(closest - position, -path_angle).y,
            target_distance: position.distance(target),
        }
    }

    fn observe(&self, path: &PathCurve, measured: &VesselState) -> Vec<f64> {
        let cfg = &self.config;
        let mut obs = vec![0.0; cfg.observation_len()];

        let e = self.tracking_errors(path, measured);
        obs[0] = (e.surge / cfg.max_surge).clamp(-1.0, 1.0);
        obs[1] = (e.heading / PI).clamp(-1.0, 1.0);
        obs[2] = (e.cross_track / cfg.obstacle_range).clamp(-1.0, 1.0);
        obs[3] = (e.target_distance / cfg.obstacle_range).clamp(0.0, 1.0);

        let position = measured.position();
        let closeness = |vec: DVec2, radius: f64| {
            1.0 - ((vec.length() - cfg.vessel_radius - radius) / cfg.lookahead).clamp(0.0, 1.0)
        };
        let bearing = |vec: DVec2| wrap_angle(vec.y.atan2(vec.x) - measured.yaw) / PI;

        for (i, slot) in self.static_slots.iter() {
            let o = &self.obstacles.statics[i];
            let vec = o.position() - position;
            let at = BASE_OBSERVATION_LEN + STATIC_SLOT_LEN * slot;
            obs[at] = bearing(vec);
            obs[at + 1] = closeness(vec, o.radius());
        }

        let dynamic_base = BASE_OBSERVATION_LEN + STATIC_SLOT_LEN * cfg.static_slots;
        for (i, slot) in self.dynamic_slots.iter() {
            let o = &self.obstacles.dynamics[i];
            let vec = o.position() - position;
            let relative = rotate(o.velocity() - measured.world_velocity(), -measured.yaw) / cfg.max_surge;
            let at = dynamic_base + DYNAMIC_SLOT_LEN * slot;
            obs[at] = bearing(vec);
            obs[at + 1] = closeness(vec, o.radius());
            obs[at + 2] = relative.x.clamp(-1.0, 1.0);
            obs[at + 3] = relative.y.clamp(-1.0, 1.0);
        }

        obs
    }

    /// Step reward and whether it ends the episode, before the failure floor
    fn shape_reward(&self, path: &PathCurve, ds: f64, truth: &VesselState, obs: &[f64]) -> (f64, bool) {
        let cfg = &self.config;
        let position = truth.position();

        if let Some(contact) = vessel_collision(
            position,
            cfg.vessel_radius,
            &self.obstacles.statics,
            &self.obstacles.dynamics,
        ) {
            let kind = match contact.kind {
                ObstacleKind::Static => "static",
                ObstacleKind::Dynamic => "dynamic",
            };
            log::info!("Collision with {} obstacle {} at s = {:.1}", kind, contact.index, self.s);
            return (-cfg.collision_penalty, true);
        }

        if let Some(half_width) = cfg.playfield {
            if position.x.abs() > half_width || position.y.abs() > half_width {
                log::info!("Left playfield at ({:.1}, {:.1})", position.x, position.y);
                return (-cfg.playfield_penalty, true);
            }
        }

        let progress = ds / cfg.progress_divisor;
        let tracking = cfg.cross_track_weight * obs[2].abs() + cfg.surge_weight * (-obs[0]).max(0.0);

        let arrived = self.halfway && (path.length() - self.s).abs() < cfg.success_margin;
        if arrived {
            log::info!("Reached end of path");
        }
        (progress - tracking, arrived)
    }

    fn finished(&self) -> Evaluation {
        Evaluation {
            observation: self.last_observation.clone(),
            reward: 0.0,
            done: true,
        }
    }
}

impl Objective for PathFollowing {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn reset_objective(
        &mut self,
        rng: EpisodeRng,
        path: Option<PathCurve>,
        desired_speed: f64,
        obstacles: ObstacleSet,
    ) -> Result<VesselState, ScenarioError> {
        if !(desired_speed >= 0.0 && desired_speed.is_finite()) {
            return Err(ScenarioError::InvalidSpeed(desired_speed));
        }
        self.rng = rng;

        let path = match path {
            Some(path) => path,
            None => {
                let angle = TAU * self.rng.uniform();
                let start = polar_to_cartesian(self.config.random_path_radius, angle);
                random_curve_through_origin(&mut self.rng, start, None)?
            }
        };

        let start = path.evaluate(0.0);
        let heading = path.tangent_angle(0.0);
        let position = start
            + DVec2::new(
                self.rng.symmetric(self.config.position_noise),
                self.rng.symmetric(self.config.position_noise),
            );
        let yaw = heading + self.rng.symmetric(self.config.heading_noise);

        self.path_points = path.sample(PATH_SAMPLES);
        log::info!(
            "Objective reset: {} path, length {:.1}, {} static / {} dynamic obstacles",
            path.kind(),
            path.length(),
            obstacles.statics.len(),
            obstacles.dynamics.len()
        );
        self.path = Some(path);
        self.desired_speed = desired_speed;
        self.obstacles = obstacles;
        self.static_slots.clear();
        self.dynamic_slots.clear();
        self.cumulative_reward = 0.0;
        self.s = 0.0;
        self.last_ds = 0.0;
        self.halfway = false;
        self.phase = ObjectivePhase::Running;

        Ok(VesselState::at_rest(position, yaw))
    }

    fn initial_observation(&mut self, measured: &VesselState) -> Vec<f64> {
        self.update_slots(measured.position());
        let observation = match self.path.as_ref() {
            Some(path) => self.observe(path, measured),
            None => vec![0.0; self.config.observation_len()],
        };
        self.last_observation = observation.clone();
        observation
    }

    fn eval_objective(&mut self, _action: Action, measured: &VesselState, truth: &VesselState) -> Evaluation {
        if self.phase != ObjectivePhase::Running {
            return self.finished();
        }
        let Some(path) = self.path.take() else {
            return self.finished();
        };

        self.obstacles.step(self.clock.dt());

        let s_new = path.closest_s_near(measured.position(), self.s);
        let ds = s_new - self.s;
        self.s = s_new;
        self.last_ds = ds;
        self.halfway |= self.s >= path.length() / 2.0;

        self.update_slots(measured.position());
        let observation = self.observe(&path, measured);
        let (reward, mut done) = self.shape_reward(&path, ds, truth, &observation);
        self.path = Some(path);

        self.cumulative_reward += reward;
        if !done && self.cumulative_reward < self.config.failure_threshold {
            log::info!("Cumulative reward {:.2} below floor", self.cumulative_reward);
            done = true;
        }
        if done {
            self.phase = ObjectivePhase::Done;
        }

        log::debug!("s = {:.2}, ds = {:.3}, reward = {:.4}", self.s, ds, reward);
        self.last_observation = observation.clone();
        Evaluation {
            observation,
            reward,
            done,
        }
    }

    fn render_objective(&self, viewer: &mut dyn Viewer) {
        let Some(path) = self.path.as_ref() else {
            return;
        };
        viewer.draw_polyline(&self.path_points, PATH_COLOR, 3.0);
        viewer.draw_circle(path.evaluate(self.s), 1.0, PROGRESS_COLOR, true);
    }

    fn observation_len(&self) -> usize {
        self.config.observation_len()
    }

    fn phase(&self) -> ObjectivePhase {
        self.phase
    }

    fn path(&self) -> Option<&PathCurve> {
        self.path.as_ref()
    }

    fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    fn is_tracked(&self, dynamic: bool, index: usize) -> bool {
        if dynamic {
            self.dynamic_slots.contains(index)
        } else {
            self.static_slots.contains(index)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCommand, DrawList};
    use crate::sim::obstacle::{DynamicObstacle, StaticObstacle};
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn objective() -> PathFollowing {
        let clock = Clock::new(0.05).unwrap();
        PathFollowing::new(&clock, ObjectiveConfig::default()).unwrap()
    }

    fn straight(length: f64) -> PathCurve {
        PathCurve::line(DVec2::ZERO, DVec2::new(length, 0.0)).unwrap()
    }

    #[test]
    fn test_initial_pose_is_perturbed_path_start() {
        let mut obj = objective();
        let pose = obj
            .reset_objective(EpisodeRng::new(1), Some(straight(500.0)), 4.0, ObstacleSet::default())
            .unwrap();
        assert!(pose.x.abs() <= 1.0 && pose.y.abs() <= 1.0);
        assert!(pose.yaw.abs() <= 0.05);
        assert_eq!(pose.nu(), glam::DVec3::ZERO);
        assert_eq!(obj.phase(), ObjectivePhase::Running);
    }

    #[test]
    fn test_random_path_when_none_given() {
        let mut obj = objective();
        let pose = obj
            .reset_objective(EpisodeRng::new(8), None, 4.0, ObstacleSet::default())
            .unwrap();
        let path = obj.path().unwrap();
        assert_eq!(path.kind(), "spline");
        assert_relative_eq!(path.evaluate(0.0).length(), 200.0, epsilon = 1e-6);
        assert!(pose.position().distance(path.evaluate(0.0)) <= 2.0f64.sqrt());
    }

    #[test]
    fn test_invalid_speed_rejected() {
        let mut obj = objective();
        let err = obj.reset_objective(EpisodeRng::new(1), Some(straight(10.0)), -1.0, ObstacleSet::default());
        assert!(matches!(err, Err(ScenarioError::InvalidSpeed(_))));
    }

    #[test]
    fn test_collision_on_first_step() {
        let mut obj = objective();
        let obstacles = ObstacleSet {
            statics: vec![StaticObstacle::new(DVec2::ZERO, 4.0).unwrap()],
            dynamics: Vec::new(),
        };
        let pose = obj
            .reset_objective(EpisodeRng::new(5), Some(straight(500.0)), 4.0, obstacles)
            .unwrap();
        let eval = obj.eval_objective(Action::default(), &pose, &pose);
        assert!(eval.done);
        assert_eq!(eval.reward, -25.0);
        assert_eq!(obj.phase(), ObjectivePhase::Done);

        let after = obj.eval_objective(Action::default(), &pose, &pose);
        assert!(after.done);
        assert_eq!(after.reward, 0.0);
        assert_eq!(obj.cumulative_reward(), -25.0);
    }

    #[test]
    fn test_arrival_step_still_pays_progress() {
        let mut obj = objective();
        obj.reset_objective(EpisodeRng::new(2), Some(straight(10.0)), 4.0, ObstacleSet::default())
            .unwrap();
        let near_end = VesselState::at_rest(DVec2::new(8.0, 0.0), 0.0);
        let eval = obj.eval_objective(Action::default(), &near_end, &near_end);
        assert!(!eval.done);

        let at_end = VesselState::at_rest(DVec2::new(9.5, 0.0), 0.0);
        let eval = obj.eval_objective(Action::default(), &at_end, &at_end);
        assert!(eval.done);
        assert_relative_eq!(obj.last_ds(), 1.5);
        assert_relative_eq!(eval.reward, 1.5 / 4.0);
        assert_eq!(obj.phase(), ObjectivePhase::Done);
    }

    #[test]
    fn test_circle_start_is_not_arrival() {
        let mut obj = objective();
        let circle = PathCurve::circle(DVec2::ZERO, 300.0).unwrap();
        let length = circle.length();
        obj.reset_objective(EpisodeRng::new(2), Some(circle), 4.0, ObstacleSet::default())
            .unwrap();

        // Slightly behind the start: projects to a small negative s, not a full lap
        let behind = VesselState::at_rest(DVec2::new(300.0, -0.5), FRAC_PI_2);
        let eval = obj.eval_objective(Action::default(), &behind, &behind);
        assert!(!eval.done);
        assert_relative_eq!(obj.s(), -0.5, epsilon = 1e-3);

        // Walk round the circle; arrival fires only after the lap
        let mut done_at = None;
        for i in 1..=400 {
            let s = length * i as f64 / 400.0;
            let state = VesselState::at_rest(polar_to_cartesian(300.0, s / 300.0), 0.0);
            if obj.eval_objective(Action::default(), &state, &state).done {
                done_at = Some(i);
                break;
            }
        }
        assert_eq!(done_at, Some(400));
    }

    #[test]
    fn test_failure_floor() {
        let mut obj = objective();
        obj.reset_objective(EpisodeRng::new(3), Some(straight(500.0)), 4.0, ObstacleSet::default())
            .unwrap();
        let far = VesselState::at_rest(DVec2::new(0.0, 1000.0), 0.0);
        for step in 1..=100 {
            let eval = obj.eval_objective(Action::default(), &far, &far);
            assert_eq!(eval.reward, -0.5);
            assert!(!eval.done, "ended early at step {step}");
        }
        assert_eq!(obj.cumulative_reward(), -50.0);
        let eval = obj.eval_objective(Action::default(), &far, &far);
        assert!(eval.done);
    }

    #[test]
    fn test_progress_reward_and_errors() {
        let mut obj = objective();
        obj.reset_objective(EpisodeRng::new(4), Some(straight(500.0)), 4.0, ObstacleSet::default())
            .unwrap();
        let state = VesselState {
            x: 8.0,
            y: 3.0,
            surge: 4.0,
            ..Default::default()
        };
        let eval = obj.eval_objective(Action::default(), &state, &state);
        assert_relative_eq!(obj.s(), 8.0);
        assert_relative_eq!(eval.observation[0], 0.0);
        assert_relative_eq!(eval.observation[2], -3.0 / 150.0);
        // Target sits 75 ahead of the projection on the path
        let target_dist = DVec2::new(83.0, 0.0).distance(DVec2::new(8.0, 3.0));
        assert_relative_eq!(eval.observation[3], target_dist / 150.0);
        assert_relative_eq!(eval.reward, 8.0 / 4.0 - 0.5 * 3.0 / 150.0);
    }

    #[test]
    fn test_overspeed_penalised() {
        let mut obj = objective();
        obj.reset_objective(EpisodeRng::new(4), Some(straight(500.0)), 4.0, ObstacleSet::default())
            .unwrap();
        let state = VesselState {
            surge: 9.0,
            ..Default::default()
        };
        let eval = obj.eval_objective(Action::default(), &state, &state);
        assert_relative_eq!(eval.observation[0], -0.5);
        assert_relative_eq!(eval.reward, -0.25);
    }

    #[test]
    fn test_observation_layout_and_bounds() {
        let mut obj = objective();
        let path = straight(500.0);
        let obstacles = ObstacleSet {
            statics: vec![
                StaticObstacle::new(DVec2::new(50.0, 20.0), 5.0).unwrap(),
                StaticObstacle::new(DVec2::new(400.0, 0.0), 5.0).unwrap(),
            ],
            dynamics: vec![DynamicObstacle::new(path.reverse(), 2.0, 400.0, 5.0).unwrap()],
        };
        let pose = obj.reset_objective(EpisodeRng::new(6), Some(path), 4.0, obstacles).unwrap();
        let obs = obj.initial_observation(&pose);
        assert_eq!(obs.len(), obj.observation_len());
        assert!(obj.is_tracked(false, 0));
        assert!(!obj.is_tracked(false, 1));
        assert!(obj.is_tracked(true, 0));

        let static_slot = obj.static_slots().slot_of(0).unwrap();
        let at = 4 + 2 * static_slot;
        let expected_bearing = wrap_angle(
            (DVec2::new(50.0, 20.0) - pose.position()).to_angle() - pose.yaw,
        ) / PI;
        assert_relative_eq!(obs[at], expected_bearing, epsilon = 1e-12);
        assert!(obs[at + 1] > 0.0 && obs[at + 1] < 1.0);

        // Head-on traffic at rest observer: relative velocity points backwards
        let dyn_slot = obj.dynamic_slots().slot_of(0).unwrap();
        let at = 4 + 2 * 4 + 4 * dyn_slot;
        assert!(obs[at + 2] < 0.0);
        assert_relative_eq!(obs[at + 2].abs(), 0.2, epsilon = 0.01);

        for (i, v) in obs.iter().enumerate() {
            let (lo, hi) = if i == 3 { (0.0, 1.0) } else { (-1.0, 1.0) };
            assert!(*v >= lo && *v <= hi, "obs[{i}] = {v}");
        }
    }

    #[test]
    fn test_dynamic_obstacles_advance_each_step() {
        let mut obj = objective();
        let path = straight(500.0);
        let obstacles = ObstacleSet {
            statics: Vec::new(),
            dynamics: vec![DynamicObstacle::new(path.clone(), 2.0, 20.0, 5.0).unwrap()],
        };
        let pose = obj.reset_objective(EpisodeRng::new(7), Some(path), 4.0, obstacles).unwrap();
        let far = VesselState { y: 300.0, ..pose };
        for _ in 0..10 {
            obj.eval_objective(Action::default(), &far, &far);
        }
        assert_relative_eq!(obj.obstacles().dynamics[0].s(), 21.0, epsilon = 1e-9);
    }

    #[test]
    fn test_render_draws_path_and_progress() {
        let mut obj = objective();
        let mut list = DrawList::new();
        obj.render_objective(&mut list);
        assert!(list.is_empty());

        obj.reset_objective(EpisodeRng::new(1), Some(straight(100.0)), 4.0, ObstacleSet::default())
            .unwrap();
        obj.render_objective(&mut list);
        assert_eq!(list.len(), 2);
        match &list.commands[0] {
            DrawCommand::Polyline { points, .. } => assert_eq!(points.len(), PATH_SAMPLES),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(obj.s(), 0.0);
    }
}
