//! Objectives turn vessel state into observation, reward and termination

pub mod path_following;
pub mod slots;

pub use path_following::PathFollowing;
pub use slots::SlotTable;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ScenarioError;
use crate::path::PathCurve;
use crate::renderer::Viewer;
use crate::sim::obstacle::ObstacleSet;
use crate::sim::state::{Action, EpisodeRng, VesselState};

/// Output of one objective evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub observation: Vec<f64>,
    pub reward: f64,
    pub done: bool,
}

/// Episode progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectivePhase {
    Init,
    Running,
    Done,
}

pub trait Objective {
    fn name(&self) -> &'static str;

    /// Start an episode and return the vessel's initial pose
    ///
    /// The objective keeps `rng` for the rest of the episode.
    fn reset_objective(
        &mut self,
        rng: EpisodeRng,
        path: Option<PathCurve>,
        desired_speed: f64,
        obstacles: ObstacleSet,
    ) -> Result<VesselState, ScenarioError>;

    /// Observation for the state the episode starts in
    fn initial_observation(&mut self, measured: &VesselState) -> Vec<f64>;

    fn eval_objective(&mut self, action: Action, measured: &VesselState, truth: &VesselState) -> Evaluation;

    fn render_objective(&self, viewer: &mut dyn Viewer);

    fn observation_len(&self) -> usize;

    fn phase(&self) -> ObjectivePhase;

    /// Reference path of the running episode
    fn path(&self) -> Option<&PathCurve>;

    fn obstacles(&self) -> &ObstacleSet;

    /// Whether the static (`false`) or dynamic (`true`) obstacle `index` is tracked
    fn is_tracked(&self, dynamic: bool, index: usize) -> bool;
}

/// Tunable constants of the path-following objective
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveConfig {
    pub max_surge: f64,
    pub lookahead: f64,
    pub obstacle_range: f64,
    pub range_hysteresis: f64,
    pub collision_penalty: f64,
    pub failure_threshold: f64,
    pub success_margin: f64,
    pub progress_divisor: f64,
    pub cross_track_weight: f64,
    pub surge_weight: f64,
    pub vessel_radius: f64,
    pub static_slots: usize,
    pub dynamic_slots: usize,
    /// Half-width of the square playfield; `None` disables the check
    pub playfield: Option<f64>,
    pub playfield_penalty: f64,
    /// Initial pose noise: uniform in ±position_noise, ±heading_noise
    pub position_noise: f64,
    pub heading_noise: f64,
    /// Distance of the random path's start from the origin
    pub random_path_radius: f64,
}

impl Default for ObjectiveConfig {
    fn default() -> Self {
        Self {
            max_surge: MAX_SURGE,
            lookahead: LOOKAHEAD_DISTANCE,
            obstacle_range: OBSTACLE_RANGE,
            range_hysteresis: RANGE_HYSTERESIS,
            collision_penalty: COLLISION_PENALTY,
            failure_threshold: FAILURE_THRESHOLD,
            success_margin: SUCCESS_MARGIN,
            progress_divisor: PROGRESS_DIVISOR,
            cross_track_weight: CROSS_TRACK_WEIGHT,
            surge_weight: SURGE_WEIGHT,
            vessel_radius: VESSEL_RADIUS,
            static_slots: STATIC_SLOTS,
            dynamic_slots: DYNAMIC_SLOTS,
            playfield: None,
            playfield_penalty: PLAYFIELD_PENALTY,
            position_noise: 1.0,
            heading_noise: 0.05,
            random_path_radius: 200.0,
        }
    }
}

impl ObjectiveConfig {
    /// Fixed observation length for this configuration
    pub fn observation_len(&self) -> usize {
        BASE_OBSERVATION_LEN + STATIC_SLOT_LEN * self.static_slots + DYNAMIC_SLOT_LEN * self.dynamic_slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_observation_len() {
        let config = ObjectiveConfig::default();
        assert_eq!(config.observation_len(), 4 + 2 * 4 + 4 * 2);
    }

    #[test]
    fn test_config_partial_json() {
        let config: ObjectiveConfig = serde_json::from_str(r#"{"static_slots": 0, "playfield": 600.0}"#).unwrap();
        assert_eq!(config.static_slots, 0);
        assert_eq!(config.playfield, Some(600.0));
        assert_eq!(config.lookahead, LOOKAHEAD_DISTANCE);
    }
}
