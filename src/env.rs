//! Episode environment
//!
//! Composes the clock, a dynamics model, a navigator and an objective. One
//! call to [`Environment::step`] advances the vessel one fixed step:
//!
//! 1. Model steps from the action
//! 2. Navigator estimates the measured state
//! 3. Objective evaluates observation, reward and termination
//! 4. Clock advances

use std::collections::BTreeMap;

use crate::error::{ConfigError, EnvError, ScenarioError};
use crate::navigator::{IdentityNavigator, Navigator};
use crate::objective::Objective;
use crate::registry::{self, ModelFn};
use crate::renderer::shapes::{circle_outline, vessel_outline};
use crate::renderer::{DETECTED_OBSTACLE_COLOR, OBSTACLE_COLOR, REFERENCE_COLOR, VESSEL_COLOR, Viewer};
use crate::scenario::ScenarioFn;
use crate::settings::Settings;
use crate::sim::clock::Clock;
use crate::sim::model::{DynamicsModel, VesselConfig};
use crate::sim::obstacle::Obstacle;
use crate::sim::state::{Action, ControlReference, EpisodeRng, VesselState};

/// Drawn hull size (m)
const HULL_LENGTH: f64 = 12.0;
const HULL_BEAM: f64 = 6.0;
const REFERENCE_ARROW_LENGTH: f64 = 25.0;
const SENSOR_RING_COLOR: [f32; 4] = [0.3, 0.3, 0.5, 0.4];

/// Result of one environment step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub observation: Vec<f64>,
    pub reward: f64,
    pub done: bool,
    pub info: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeStatus {
    NotReset,
    Running,
    Finished,
}

pub struct Environment {
    settings: Settings,
    clock: Clock,
    make_model: ModelFn,
    model: Box<dyn DynamicsModel>,
    /// Whether the current model was built with the controller
    controller_active: bool,
    objective: Box<dyn Objective>,
    navigator: Box<dyn Navigator>,
    scenario: ScenarioFn,
    status: EpisodeStatus,
    steps: u64,
    cumulative_reward: f64,
}

impl Environment {
    /// Build from settings and a registered scenario name
    pub fn new(settings: Settings, scenario: &str) -> Result<Self, ConfigError> {
        let scenario = registry::scenario(scenario)?;
        Self::with_scenario(settings, scenario)
    }

    /// Build with a caller-supplied scenario generator
    pub fn with_scenario(settings: Settings, scenario: ScenarioFn) -> Result<Self, ConfigError> {
        settings.validate()?;
        let clock = Clock::new(settings.step_size)?;
        let make_model = registry::model(&settings.model)?;
        let model = make_model(&clock, settings.vessel)?;
        let objective = registry::objective(&settings.objective)?(&clock, settings.objective_config)?;

        log::info!(
            "Environment ready: model {}, objective {}, dt {}",
            model.name(),
            objective.name(),
            clock.dt()
        );

        Ok(Self {
            controller_active: settings.vessel.use_controller,
            settings,
            clock,
            make_model,
            model,
            objective,
            navigator: Box::new(IdentityNavigator),
            scenario,
            status: EpisodeStatus::NotReset,
            steps: 0,
            cumulative_reward: 0.0,
        })
    }

    /// Swap the state estimator; takes effect from the next step
    pub fn set_navigator(&mut self, navigator: Box<dyn Navigator>) {
        self.navigator = navigator;
    }

    /// Start a new episode fully determined by `seed`
    pub fn reset(&mut self, seed: u64) -> Result<Vec<f64>, EnvError> {
        let mut rng = EpisodeRng::new(seed);
        let scenario = (self.scenario)(&mut rng)?;
        scenario.validate()?;

        let use_controller = self.settings.vessel.use_controller && scenario.use_controller;
        if use_controller != self.controller_active {
            let config = VesselConfig {
                use_controller,
                ..self.settings.vessel
            };
            self.model = (self.make_model)(&self.clock, config)?;
            self.controller_active = use_controller;
        }

        let mut initial =
            self.objective
                .reset_objective(rng, scenario.path, scenario.desired_speed, scenario.obstacles)?;
        if self.objective.path().is_none() {
            return Err(ScenarioError::MissingPath.into());
        }
        if !initial.eta().is_finite() {
            return Err(ScenarioError::MissingInitialPose.into());
        }
        initial.surge = scenario.initial_surge;

        self.clock.reset();
        self.model.reset(initial);
        let measured = self.navigator.estimate(&self.model.state());
        let observation = self.objective.initial_observation(&measured);

        self.status = EpisodeStatus::Running;
        self.steps = 0;
        self.cumulative_reward = 0.0;
        log::info!(
            "Episode {} started at ({:.1}, {:.1}), controller {}",
            seed,
            initial.x,
            initial.y,
            if use_controller { "on" } else { "off" }
        );
        Ok(observation)
    }

    pub fn step(&mut self, action: Action) -> Result<StepResult, EnvError> {
        match self.status {
            EpisodeStatus::NotReset => return Err(EnvError::NotReset),
            EpisodeStatus::Finished => return Err(EnvError::EpisodeFinished),
            EpisodeStatus::Running => {}
        }

        let truth = self.model.step(action);
        let measured = self.navigator.estimate(&truth);
        let eval = self.objective.eval_objective(action, &measured, &truth);
        self.clock.step();

        self.steps += 1;
        self.cumulative_reward += eval.reward;
        if eval.done {
            self.status = EpisodeStatus::Finished;
            log::info!(
                "Episode finished after {} steps ({:.1} s), return {:.2}",
                self.steps,
                self.clock.time(),
                self.cumulative_reward
            );
        }

        Ok(StepResult {
            observation: eval.observation,
            reward: eval.reward,
            done: eval.done,
            info: BTreeMap::new(),
        })
    }

    /// Draw the path, obstacles and vessel
    pub fn render(&self, viewer: &mut dyn Viewer) {
        self.objective.render_objective(viewer);

        let color = |tracked: bool| if tracked { DETECTED_OBSTACLE_COLOR } else { OBSTACLE_COLOR };
        let obstacles = self.objective.obstacles();
        for (i, o) in obstacles.statics.iter().enumerate() {
            viewer.draw_circle(o.position(), o.radius(), color(self.objective.is_tracked(false, i)), true);
        }
        for (i, o) in obstacles.dynamics.iter().enumerate() {
            let c = color(self.objective.is_tracked(true, i));
            viewer.draw_circle(o.position(), o.radius(), c, true);
            viewer.draw_arrow(o.position(), o.heading(), 2.0 * o.radius(), c);
        }

        if self.status == EpisodeStatus::NotReset {
            return;
        }
        let state = self.model.state();
        let position = state.position();
        let range = self.settings.objective_config.obstacle_range;
        viewer.draw_polyline(&circle_outline(position, range, 64), SENSOR_RING_COLOR, 1.0);
        viewer.draw_shape(
            &vessel_outline(position, state.yaw, HULL_LENGTH, HULL_BEAM),
            VESSEL_COLOR,
        );
        viewer.draw_arrow(
            position,
            self.model.reference().desired_heading,
            REFERENCE_ARROW_LENGTH,
            REFERENCE_COLOR,
        );
    }

    pub fn status(&self) -> EpisodeStatus {
        self.status
    }

    pub fn state(&self) -> VesselState {
        self.model.state()
    }

    pub fn reference(&self) -> ControlReference {
        self.model.reference()
    }

    pub fn objective(&self) -> &dyn Objective {
        self.objective.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn observation_len(&self) -> usize {
        self.objective.observation_len()
    }

    pub fn controller_active(&self) -> bool {
        self.controller_active
    }

    /// Simulated time since reset (seconds)
    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn cumulative_reward(&self) -> f64 {
        self.cumulative_reward
    }
}
