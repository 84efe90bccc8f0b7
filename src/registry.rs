//! Name lookup for models, objectives and scenarios
//!
//! Plain static tables; adding an entry is the only registration step.

use crate::error::ConfigError;
use crate::objective::{Objective, ObjectiveConfig, PathFollowing};
use crate::scenario::{self, ScenarioFn};
use crate::sim::clock::Clock;
use crate::sim::hull::{Auv, Hull, SupplyShip};
use crate::sim::model::{DynamicsModel, Vessel, VesselConfig};

pub type ModelFn = fn(&Clock, VesselConfig) -> Result<Box<dyn DynamicsModel>, ConfigError>;
pub type ObjectiveFn = fn(&Clock, ObjectiveConfig) -> Result<Box<dyn Objective>, ConfigError>;

fn supply_ship(clock: &Clock, config: VesselConfig) -> Result<Box<dyn DynamicsModel>, ConfigError> {
    let vessel = Vessel::new(clock, SupplyShip::new(), config)?;
    Ok(Box::new(vessel))
}

fn auv(clock: &Clock, config: VesselConfig) -> Result<Box<dyn DynamicsModel>, ConfigError> {
    let vessel = Vessel::new(clock, Auv::new(), config)?;
    Ok(Box::new(vessel))
}

fn path_following(clock: &Clock, config: ObjectiveConfig) -> Result<Box<dyn Objective>, ConfigError> {
    let objective = PathFollowing::new(clock, config)?;
    Ok(Box::new(objective))
}

/// Integration schemes; models only implement semi-implicit Euler
pub static SOLVERS: &[&str] = &["semi_implicit_euler"];

pub static MODELS: &[(&str, ModelFn)] = &[
    (SupplyShip::NAME, supply_ship),
    (Auv::NAME, auv),
];

pub static OBJECTIVES: &[(&str, ObjectiveFn)] = &[(PathFollowing::NAME, path_following)];

pub static SCENARIOS: &[(&str, ScenarioFn)] = &[
    ("example", scenario::example),
    ("straight_path", scenario::straight_path),
    ("curved_path", scenario::curved_path),
    ("circular_path", scenario::circular_path),
    ("straight_path_overtaking", scenario::straight_path_overtaking),
    ("curved_path_overtaking", scenario::curved_path_overtaking),
    ("straight_path_ship_collision", scenario::straight_path_ship_collision),
    ("curved_path_ship_collision", scenario::curved_path_ship_collision),
    ("curved_path_static_obstacles", scenario::curved_path_static_obstacles),
    (
        "curved_path_static_dynamic_obstacles",
        scenario::curved_path_static_dynamic_obstacles,
    ),
];

fn find<T: Copy>(table: &[(&str, T)], name: &str) -> Option<T> {
    table.iter().find(|(n, _)| *n == name).map(|&(_, f)| f)
}

pub fn solver(name: &str) -> Result<&'static str, ConfigError> {
    SOLVERS
        .iter()
        .copied()
        .find(|&n| n == name)
        .ok_or_else(|| ConfigError::UnknownSolver(name.to_string()))
}

pub fn model(name: &str) -> Result<ModelFn, ConfigError> {
    find(MODELS, name).ok_or_else(|| ConfigError::UnknownModel(name.to_string()))
}

pub fn objective(name: &str) -> Result<ObjectiveFn, ConfigError> {
    find(OBJECTIVES, name).ok_or_else(|| ConfigError::UnknownObjective(name.to_string()))
}

pub fn scenario(name: &str) -> Result<ScenarioFn, ConfigError> {
    find(SCENARIOS, name).ok_or_else(|| ConfigError::UnknownScenario {
        name: name.to_string(),
        known: scenario_names().collect::<Vec<_>>().join(", "),
    })
}

/// Registered scenario names, in table order
pub fn scenario_names() -> impl Iterator<Item = &'static str> {
    SCENARIOS.iter().map(|(n, _)| *n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::EpisodeRng;

    #[test]
    fn test_lookup_known_names() {
        let clock = Clock::new(0.05).unwrap();
        let ship = model("supply_ship_3dof").unwrap()(&clock, VesselConfig::default()).unwrap();
        assert_eq!(ship.name(), "supply_ship_3dof");

        let open_loop = VesselConfig {
            use_controller: false,
            ..Default::default()
        };
        let auv = model("auv_2d").unwrap()(&clock, open_loop).unwrap();
        assert_eq!(auv.name(), "auv_2d");

        let obj = objective("path_following").unwrap()(&clock, ObjectiveConfig::default()).unwrap();
        assert_eq!(obj.name(), "path_following");

        assert!(scenario("circular_path").unwrap()(&mut EpisodeRng::new(0)).is_ok());
    }

    #[test]
    fn test_unknown_names() {
        assert!(matches!(solver("rk4"), Err(ConfigError::UnknownSolver(_))));
        assert_eq!(solver("semi_implicit_euler").unwrap(), "semi_implicit_euler");
        assert!(matches!(model("tugboat"), Err(ConfigError::UnknownModel(n)) if n == "tugboat"));
        assert!(matches!(objective("docking"), Err(ConfigError::UnknownObjective(_))));
        match scenario("harbour") {
            Err(ConfigError::UnknownScenario { name, known }) => {
                assert_eq!(name, "harbour");
                assert!(known.starts_with("example, straight_path"));
                assert!(known.contains("circular_path"));
            }
            _ => panic!("expected UnknownScenario"),
        }
    }

    #[test]
    fn test_scenario_names_unique() {
        let mut names: Vec<_> = scenario_names().collect();
        assert_eq!(names.len(), 10);
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 10);
    }
}
