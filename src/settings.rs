//! Simulation settings
//!
//! Loaded from a JSON file; any field left out takes its default.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::consts::DEFAULT_STEP_SIZE;
use crate::error::ConfigError;
use crate::objective::ObjectiveConfig;
use crate::registry;
use crate::sim::model::VesselConfig;

/// Environment settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Simulation ===
    /// Fixed step of the shared clock (seconds)
    pub step_size: f64,
    /// Integration scheme
    pub solver: String,
    /// Registered dynamics model name
    pub model: String,
    /// Registered objective name
    pub objective: String,

    // === Vessel ===
    /// Controller gains and action-to-reference mapping
    pub vessel: VesselConfig,

    // === Objective ===
    /// Observation, reward and termination constants
    pub objective_config: ObjectiveConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            step_size: DEFAULT_STEP_SIZE,
            solver: "semi_implicit_euler".to_string(),
            model: "supply_ship_3dof".to_string(),
            objective: "path_following".to_string(),

            vessel: VesselConfig::default(),

            objective_config: ObjectiveConfig::default(),
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Check values that would otherwise only fail when the environment is built
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.step_size > 0.0 && self.step_size.is_finite()) {
            return Err(ConfigError::NonPositiveStepSize(self.step_size));
        }
        registry::solver(&self.solver)?;
        registry::model(&self.model)?;
        registry::objective(&self.objective)?;

        let rate = self.vessel.surge_reference_rate;
        if !(rate > 0.0 && rate.is_finite()) {
            return Err(ConfigError::InvalidSetting {
                name: "vessel.surge_reference_rate",
                reason: format!("must be positive, got {rate}"),
            });
        }
        let speeds = [
            ("vessel.cruise_speed", self.vessel.cruise_speed),
            ("vessel.heading_rate", self.vessel.heading_rate),
        ];
        for (name, value) in speeds {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::InvalidSetting {
                    name,
                    reason: format!("must be non-negative, got {value}"),
                });
            }
        }
        Ok(())
    }
}
