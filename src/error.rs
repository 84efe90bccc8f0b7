//! Error types
//!
//! Configuration and geometry errors are raised at construction; the
//! environment only fails at run time when stepped past the end of an episode.

use thiserror::Error;

/// Invalid construction parameters for clocks, blocks, models or settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("step size must be positive and finite, got {0}")]
    NonPositiveStepSize(f64),
    #[error("saturation bounds inverted: max {max} must exceed min {min}")]
    InvertedBounds { max: f64, min: f64 },
    #[error("rate limits must satisfy rising > 0 > falling, got rising {rising}, falling {falling}")]
    InvalidRateBounds { rising: f64, falling: f64 },
    #[error("derivative window needs at least two samples, got {0}")]
    InvalidWindow(usize),
    #[error("unknown solver `{0}`")]
    UnknownSolver(String),
    #[error("unknown model `{0}`")]
    UnknownModel(String),
    #[error("unknown objective `{0}`")]
    UnknownObjective(String),
    #[error("unknown scenario `{name}`; available: {known}")]
    UnknownScenario { name: String, known: String },
    #[error("model `{0}` has no feedback-linearising controller")]
    ControllerUnsupported(&'static str),
    #[error("invalid setting `{name}`: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
}

/// Degenerate path or obstacle geometry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("line endpoints coincide")]
    ZeroLength,
    #[error("circle radius must be positive, got {0}")]
    NonPositiveRadius(f64),
    #[error("spline needs at least two distinct waypoints, got {0}")]
    TooFewWaypoints(usize),
    #[error("obstacle radius must be non-negative, got {0}")]
    NegativeRadius(f64),
    #[error("non-finite coordinate in {0}")]
    NonFinite(&'static str),
}

/// Failure while generating or applying a scenario at reset.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario produced no reference path")]
    MissingPath,
    #[error("scenario produced no initial pose")]
    MissingInitialPose,
    #[error("desired speed must be non-negative and finite, got {0}")]
    InvalidSpeed(f64),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Errors surfaced by [`crate::Environment`].
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("episode finished; call reset before stepping again")]
    EpisodeFinished,
    #[error("environment has not been reset")]
    NotReset,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}
