//! Deterministic vessel simulation
//!
//! Everything here runs on the shared fixed-step clock:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Blocks invoked once per tick in model order
//! - No rendering dependencies

pub mod blocks;
pub mod clock;
pub mod collision;
pub mod controller;
pub mod hull;
pub mod model;
pub mod obstacle;
pub mod state;

pub use blocks::{Derivative, Integrator, RateLimiter, Saturation};
pub use clock::Clock;
pub use collision::{Contact, ObstacleKind, circles_overlap, clearance, first_collision, vessel_collision};
pub use controller::{ControllerGains, FeedbackLinearizingController};
pub use hull::{Auv, Hull, Linearisation, SupplyShip};
pub use model::{DynamicsModel, Vessel, VesselConfig};
pub use obstacle::{DynamicObstacle, Obstacle, ObstacleSet, StaticObstacle};
pub use state::{Action, ControlReference, EpisodeRng, VesselState};
