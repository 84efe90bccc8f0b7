//! State estimation between the true vessel state and the objective

use crate::sim::state::VesselState;

/// Turns the true state into the state the objective observes
pub trait Navigator {
    fn name(&self) -> &'static str;

    fn estimate(&mut self, truth: &VesselState) -> VesselState;
}

/// Perfect navigation: the measured state is the true state
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNavigator;

impl Navigator for IdentityNavigator {
    fn name(&self) -> &'static str {
        "identity"
    }

    #[inline]
    fn estimate(&mut self, truth: &VesselState) -> VesselState {
        *truth
    }
}
